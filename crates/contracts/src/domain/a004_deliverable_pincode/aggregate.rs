use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::validation::{is_valid_pincode, require_non_empty};

crate::uuid_aggregate_id!(
    /// Deliverable pincode identifier
    DeliverablePincodeId
);

/// Pincode the platform delivers to. `base.code` is the pincode itself,
/// `base.description` the area name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverablePincode {
    #[serde(flatten)]
    pub base: BaseAggregate<DeliverablePincodeId>,
    pub city: String,
    pub dark_store_id: Option<String>,
    pub is_active: bool,
}

impl DeliverablePincode {
    pub fn new_for_insert(dto: &DeliverablePincodeDto) -> Self {
        let base = BaseAggregate::new(
            DeliverablePincodeId::new_v4(),
            dto.pincode.trim().to_string(),
            dto.area.clone(),
        );
        let mut item = Self {
            base,
            city: String::new(),
            dark_store_id: None,
            is_active: true,
        };
        item.update(dto);
        item
    }

    pub fn update(&mut self, dto: &DeliverablePincodeDto) {
        self.base.code = dto.pincode.trim().to_string();
        self.base.description = dto.area.clone();
        self.base.comment = dto.comment.clone();
        self.city = dto.city.clone();
        self.dark_store_id = dto.dark_store_id.clone().filter(|s| !s.trim().is_empty());
        self.is_active = dto.is_active;
    }

    pub fn pincode(&self) -> &str {
        &self.base.code
    }

    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_pincode(&self.base.code) {
            return Err("Pincode must be exactly 6 digits".into());
        }
        require_non_empty(&self.base.description, "Area")?;
        require_non_empty(&self.city, "City")?;
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for DeliverablePincode {
    type Id = DeliverablePincodeId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a004"
    }

    fn collection_name() -> &'static str {
        "deliverable_pincode"
    }

    fn element_name() -> &'static str {
        "Deliverable pincode"
    }

    fn list_name() -> &'static str {
        "Deliverable pincodes"
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverablePincodeDto {
    pub id: Option<String>,
    pub pincode: String,
    pub area: String,
    pub city: String,
    pub dark_store_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PincodeCheckResponse {
    pub pincode: String,
    pub deliverable: bool,
    pub area: Option<String>,
    pub city: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let dto = DeliverablePincodeDto {
            id: None,
            pincode: " 560034 ".into(),
            area: "Koramangala".into(),
            city: "Bengaluru".into(),
            dark_store_id: Some("".into()),
            is_active: true,
            comment: None,
        };
        let p = DeliverablePincode::new_for_insert(&dto);
        assert_eq!(p.pincode(), "560034");
        assert_eq!(p.dark_store_id, None);
        assert!(p.validate().is_ok());

        let mut bad = p.clone();
        bad.base.code = "56003".into();
        assert!(bad.validate().is_err());

        let mut no_city = p;
        no_city.city = " ".into();
        assert_eq!(no_city.validate(), Err("City is required".to_string()));
    }
}
