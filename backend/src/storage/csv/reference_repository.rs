use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::lookup::{ExpenseType, ReferenceData, Status, WorkType};
use crate::storage::traits::ReferenceDataStorage;

const REFERENCE_FILE: &str = "reference_data.yaml";

/// Reference tables stored as YAML.
///
/// The tables are maintained by hand; the application only reads them.
#[derive(Clone)]
pub struct ReferenceRepository {
    connection: CsvConnection,
}

impl ReferenceRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn reference_path(&self) -> PathBuf {
        self.connection.base_directory().join(REFERENCE_FILE)
    }

    /// Write the default tables when the file does not exist yet
    pub fn ensure_seeded(&self) -> Result<()> {
        if self.reference_path().exists() {
            return Ok(());
        }
        self.save(&ReferenceData::default())?;
        info!("Seeded default reference data at {:?}", self.reference_path());
        Ok(())
    }

    /// Replace all reference tables atomically
    pub fn save(&self, data: &ReferenceData) -> Result<()> {
        let path = self.reference_path();
        let yaml_content = serde_yaml::to_string(data)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn load(&self) -> Result<ReferenceData> {
        let path = self.reference_path();
        if !path.exists() {
            return Ok(ReferenceData::default());
        }
        let yaml_content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl ReferenceDataStorage for ReferenceRepository {
    fn list_statuses(&self) -> Result<Vec<Status>> {
        Ok(self.load()?.statuses)
    }

    fn get_status(&self, status_id: i64) -> Result<Option<Status>> {
        Ok(self.load()?.statuses.into_iter().find(|s| s.id == status_id))
    }

    fn list_work_types(&self) -> Result<Vec<WorkType>> {
        Ok(self.load()?.work_types)
    }

    fn get_work_type(&self, work_type_id: i64) -> Result<Option<WorkType>> {
        Ok(self.load()?.work_types.into_iter().find(|w| w.id == work_type_id))
    }

    fn list_expense_types(&self) -> Result<Vec<ExpenseType>> {
        Ok(self.load()?.expense_types)
    }

    fn get_expense_type(&self, expense_type_id: i64) -> Result<Option<ExpenseType>> {
        Ok(self
            .load()?
            .expense_types
            .into_iter()
            .find(|e| e.id == expense_type_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;

    #[test]
    fn test_seeding_writes_defaults_once() {
        let env = TestEnvironment::new().unwrap();
        let repo = ReferenceRepository::new(env.connection.clone());

        repo.ensure_seeded().unwrap();
        assert!(env.base_path.join(REFERENCE_FILE).exists());
        assert_eq!(repo.list_statuses().unwrap(), ReferenceData::default().statuses);

        let custom = ReferenceData {
            statuses: vec![Status {
                id: 7,
                label: "Leased".to_string(),
            }],
            work_types: vec![],
            expense_types: vec![],
        };
        repo.save(&custom).unwrap();
        repo.ensure_seeded().unwrap();
        assert_eq!(repo.list_statuses().unwrap(), custom.statuses);
    }

    #[test]
    fn test_lookup_by_id() {
        let env = TestEnvironment::new().unwrap();
        let repo = ReferenceRepository::new(env.connection.clone());
        repo.ensure_seeded().unwrap();

        assert_eq!(repo.get_work_type(2).unwrap().unwrap().label, "Oil change");
        assert_eq!(repo.get_expense_type(1).unwrap().unwrap().label, "Fuel");
        assert!(repo.get_status(99).unwrap().is_none());
    }
}
