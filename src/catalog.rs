// Reference data: roles, energy types and section definitions.
//
// Read-only at runtime. The defaults mirror the seeded lookup tables; a
// deployment can replace them through the `catalog` configuration section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub key: String,
    pub label: String,
    /// Role that reviews this section on every new land
    pub default_role: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub roles: Vec<RoleDefinition>,
    pub energy_types: Vec<String>,
    pub sections: Vec<SectionDefinition>,
}

impl Catalog {
    pub fn is_role(&self, key: &str) -> bool {
        self.roles.iter().any(|role| role.key == key)
    }

    pub fn is_energy_type(&self, key: &str) -> bool {
        self.energy_types.iter().any(|energy| energy == key)
    }

    pub fn section(&self, key: &str) -> Option<&SectionDefinition> {
        self.sections.iter().find(|section| section.key == key)
    }

    /// Definitions bootstrapped onto every newly created land
    pub fn active_sections(&self) -> impl Iterator<Item = &SectionDefinition> {
        self.sections.iter().filter(|section| section.active)
    }

    /// Check internal consistency: unique keys and known default roles
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = std::collections::HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.key.as_str()) {
                anyhow::bail!("duplicate section definition '{}'", section.key);
            }
            if let Some(role) = &section.default_role {
                if !self.is_role(role) {
                    anyhow::bail!(
                        "section '{}' defaults to unknown role '{}'",
                        section.key,
                        role
                    );
                }
            }
        }
        if self.active_sections().next().is_none() {
            anyhow::bail!("catalog defines no active sections");
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let roles = [
            ("administrator", "Administrator"),
            ("landowner", "Land Owner"),
            ("investor", "Investor"),
            ("reviewer", "Reviewer"),
            ("engineer", "Engineer"),
            ("environmental_specialist", "Environmental Specialist"),
            ("legal_advisor", "Legal Advisor"),
        ]
        .into_iter()
        .map(|(key, label)| RoleDefinition {
            key: key.to_string(),
            label: label.to_string(),
        })
        .collect();

        let energy_types = ["solar", "wind", "hydroelectric", "biomass", "geothermal"]
            .into_iter()
            .map(String::from)
            .collect();

        let sections = [
            ("basic_info", "Basic Information", "reviewer"),
            ("location_details", "Location Details", "reviewer"),
            ("technical_specs", "Technical Specifications", "engineer"),
            ("environmental", "Environmental Assessment", "environmental_specialist"),
            ("legal_permits", "Legal & Permits", "legal_advisor"),
            ("financial", "Financial Information", "reviewer"),
            ("utilities", "Utilities & Infrastructure", "engineer"),
            ("timeline", "Project Timeline", "reviewer"),
            ("documentation", "Supporting Documents", "reviewer"),
        ]
        .into_iter()
        .map(|(key, label, role)| SectionDefinition {
            key: key.to_string(),
            label: label.to_string(),
            default_role: Some(role.to_string()),
            active: true,
        })
        .collect();

        Self {
            roles,
            energy_types,
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_consistent() {
        let catalog = Catalog::default();
        catalog.validate().unwrap();
        assert_eq!(catalog.active_sections().count(), 9);
        assert!(catalog.is_role("legal_advisor"));
        assert!(catalog.is_energy_type("geothermal"));
        assert_eq!(
            catalog.section("technical_specs").unwrap().default_role.as_deref(),
            Some("engineer")
        );
    }

    #[test]
    fn test_inactive_sections_are_skipped() {
        let mut catalog = Catalog::default();
        catalog.sections[0].active = false;
        assert_eq!(catalog.active_sections().count(), 8);
        assert!(catalog
            .active_sections()
            .all(|section| section.key != "basic_info"));
    }

    #[test]
    fn test_unknown_default_role_is_rejected() {
        let mut catalog = Catalog::default();
        catalog.sections[1].default_role = Some("surveyor".to_string());
        assert!(catalog.validate().is_err());
    }
}
