use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub name: String,
    pub duration_minutes: i32,
    pub price: Decimal,
}

/// The services a shop offers. Stored per shop as a JSON column and
/// validated on load, so an appointment can never reference a service
/// with a non-positive duration or a negative price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCatalog {
    pub services: Vec<Service>,
}

impl ServiceCatalog {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let catalog: ServiceCatalog = serde_json::from_str(s)?;
        for service in &catalog.services {
            if service.id.is_empty() {
                anyhow::bail!("service with empty id");
            }
            if service.duration_minutes <= 0 {
                anyhow::bail!(
                    "service {} has non-positive duration: {}",
                    service.id,
                    service.duration_minutes
                );
            }
            if service.price < Decimal::ZERO {
                anyhow::bail!("service {} has negative price: {}", service.id, service.price);
            }
        }
        Ok(catalog)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn find(&self, service_id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == service_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_catalog() {
        let json = r#"{"services":[{"id":"1","name":"Haircut","durationMinutes":30,"price":"25"},{"id":"2","name":"Beard Trim","durationMinutes":15,"price":"15"}]}"#;
        let catalog = ServiceCatalog::from_json(json).unwrap();
        assert_eq!(catalog.services.len(), 2);
        assert_eq!(catalog.find("2").unwrap().name, "Beard Trim");
        assert!(catalog.find("9").is_none());
    }

    #[test]
    fn test_parse_rejects_zero_duration() {
        let json = r#"{"services":[{"id":"1","name":"Haircut","durationMinutes":0,"price":"25"}]}"#;
        assert!(ServiceCatalog::from_json(json).is_err());
    }

    #[test]
    fn test_parse_rejects_negative_price() {
        let json = r#"{"services":[{"id":"1","name":"Haircut","durationMinutes":30,"price":"-1"}]}"#;
        assert!(ServiceCatalog::from_json(json).is_err());
    }

    #[test]
    fn test_parse_rejects_empty_id() {
        let json = r#"{"services":[{"id":"","name":"Haircut","durationMinutes":30,"price":"25"}]}"#;
        assert!(ServiceCatalog::from_json(json).is_err());
    }

    #[test]
    fn test_round_trip() {
        let json = r#"{"services":[{"id":"1","name":"Haircut","durationMinutes":30,"price":"25"}]}"#;
        let catalog = ServiceCatalog::from_json(json).unwrap();
        let again = ServiceCatalog::from_json(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(again.services[0].name, "Haircut");
    }
}
