// Section aggregation does not depend on the order reviewers decide in

mod common;

use common::*;
use landflow::domain::{LandStatus, SectionDecision};
use proptest::prelude::*;

fn section_count() -> usize {
    landflow::Catalog::default().active_sections().count()
}

fn decision_order() -> impl Strategy<Value = Vec<usize>> {
    Just((0..section_count()).collect::<Vec<_>>()).prop_shuffle()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn approving_every_section_in_any_order_approves_the_land(order in decision_order()) {
        runtime().block_on(async {
            let engine = engine();
            let board = review_board();
            let land_id = submitted_land(&engine, &landowner()).await;
            let sections = snapshot(&engine, land_id).await.sections;

            let (last, rest) = order.split_last().unwrap();
            for &index in rest {
                engine
                    .decide_section(&board, sections[index].id, SectionDecision::Approved, None)
                    .await
                    .unwrap();
            }
            assert_eq!(snapshot(&engine, land_id).await.land.status, LandStatus::UnderReview);

            engine
                .decide_section(&board, sections[*last].id, SectionDecision::Approved, None)
                .await
                .unwrap();
            assert_eq!(snapshot(&engine, land_id).await.land.status, LandStatus::Approved);
        });
    }

    #[test]
    fn one_rejection_anywhere_blocks_approval(
        order in decision_order(),
        rejected in 0..section_count(),
    ) {
        runtime().block_on(async {
            let engine = engine();
            let board = review_board();
            let land_id = submitted_land(&engine, &landowner()).await;
            let sections = snapshot(&engine, land_id).await.sections;

            for index in order {
                let decision = if index == rejected {
                    SectionDecision::Rejected
                } else {
                    SectionDecision::Approved
                };
                engine
                    .decide_section(&board, sections[index].id, decision, None)
                    .await
                    .unwrap();
            }
            assert_eq!(snapshot(&engine, land_id).await.land.status, LandStatus::UnderReview);
        });
    }
}
