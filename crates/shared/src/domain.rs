use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ItemId);
id_newtype!(GeoStateId);

/// A recyclable-item category offered by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectItem {
    pub id: ItemId,
    pub title: String,
    pub image_url: String,
}

/// A country subdivision as listed by the geo-division service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoState {
    pub id: GeoStateId,
    pub initials: String,
    pub name: String,
}

impl GeoState {
    pub fn label(&self) -> String {
        format!("{} - {}", self.initials, self.name)
    }
}

pub type City = String;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Email,
    Whatsapp,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Name, FormField::Email, FormField::Whatsapp];

    pub fn key(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Whatsapp => "whatsapp",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Entity Name",
            FormField::Email => "Email",
            FormField::Whatsapp => "Whatsapp",
        }
    }
}

impl std::str::FromStr for FormField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(FormField::Name),
            "email" => Ok(FormField::Email),
            "whatsapp" => Ok(FormField::Whatsapp),
            other => Err(format!("unknown form field '{other}'")),
        }
    }
}

impl FormData {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Whatsapp => &self.whatsapp,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Whatsapp => &mut self.whatsapp,
        };
        *slot = value.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_one_field_leaves_the_others_alone() {
        let mut data = FormData {
            name: "Recicla".into(),
            email: "a@b.c".into(),
            whatsapp: "11999".into(),
        };
        data.set(FormField::Email, "new@b.c");
        assert_eq!(data.name, "Recicla");
        assert_eq!(data.email, "new@b.c");
        assert_eq!(data.whatsapp, "11999");
    }

    #[test]
    fn parses_field_names_case_insensitively() {
        assert_eq!("WhatsApp".parse::<FormField>(), Ok(FormField::Whatsapp));
        assert!("phone".parse::<FormField>().is_err());
    }

    #[test]
    fn item_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&vec![ItemId(2), ItemId(5)]).expect("serialize");
        assert_eq!(json, "[2,5]");
    }
}
