//! Wire shapes for the catalog API and the geo-division service.

use serde::{Deserialize, Serialize};

use crate::domain::{CollectItem, GeoState, GeoStateId, ItemId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectItemPayload {
    pub id: ItemId,
    pub title: String,
    pub image_url: String,
}

impl From<CollectItemPayload> for CollectItem {
    fn from(value: CollectItemPayload) -> Self {
        Self {
            id: value.id,
            title: value.title,
            image_url: value.image_url,
        }
    }
}

/// State record as published by the geo-division service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoStatePayload {
    pub id: GeoStateId,
    pub sigla: String,
    pub nome: String,
}

impl From<GeoStatePayload> for GeoState {
    fn from(value: GeoStatePayload) -> Self {
        Self {
            id: value.id,
            initials: value.sigla,
            name: value.nome,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityPayload {
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePointRequest {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub state: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "collectItems")]
    pub collect_items: Vec<ItemId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_point_request_uses_camel_case_item_key() {
        let request = CreatePointRequest {
            name: "Recicla".into(),
            email: "contato@recicla.org".into(),
            whatsapp: "11988887777".into(),
            state: "SP".into(),
            city: "São Paulo".into(),
            latitude: -23.5,
            longitude: -46.6,
            collect_items: vec![ItemId(2), ItemId(5)],
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["collectItems"], serde_json::json!([2, 5]));
        assert_eq!(value["state"], "SP");
        assert_eq!(value["city"], "São Paulo");
        assert!(value.get("collect_items").is_none());
    }

    #[test]
    fn geo_state_payload_maps_to_domain_names() {
        let payload: GeoStatePayload =
            serde_json::from_str(r#"{"id":35,"sigla":"SP","nome":"São Paulo"}"#).expect("parse");
        let state = GeoState::from(payload);
        assert_eq!(state.id, GeoStateId(35));
        assert_eq!(state.initials, "SP");
        assert_eq!(state.label(), "SP - São Paulo");
    }
}
