//! Datos personales: los que envía el step de user-info y los que el host
//! puede predefinir para saltar steps antes de que empiece la presentación.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Formato de fecha de nacimiento que espera el backend.
pub const DATE_OF_BIRTH_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    first_name: String,
    last_name: String,
    date_of_birth: NaiveDate,
}

impl UserInfo {
    pub fn new(first_name: &str, last_name: &str, date_of_birth: NaiveDate) -> Result<Self, DomainError> {
        let first = first_name.trim();
        let last = last_name.trim();
        if first.is_empty() {
            return Err(DomainError::ValidationError("first name is required".to_string()));
        }
        if last.is_empty() {
            return Err(DomainError::ValidationError("last name is required".to_string()));
        }
        Ok(UserInfo { first_name: first.to_string(),
                      last_name: last.to_string(),
                      date_of_birth })
    }

    /// Construye desde texto libre del formulario; la fecha debe ser `yyyy-MM-dd`.
    pub fn parse(first_name: &str, last_name: &str, date_of_birth: &str) -> Result<Self, DomainError> {
        let dob = NaiveDate::parse_from_str(date_of_birth.trim(), DATE_OF_BIRTH_FORMAT)
            .map_err(|_| DomainError::ValidationError(format!("invalid date of birth '{}'", date_of_birth.trim())))?;
        UserInfo::new(first_name, last_name, dob)
    }

    pub fn first_name(&self) -> &str { &self.first_name }
    pub fn last_name(&self) -> &str { &self.last_name }
    pub fn date_of_birth(&self) -> NaiveDate { self.date_of_birth }

    pub fn date_of_birth_wire(&self) -> String {
        self.date_of_birth.format(DATE_OF_BIRTH_FORMAT).to_string()
    }
}

/// Valores suministrados por el host antes de iniciar la sesión.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredefinedUserInfo {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
}

fn filled(v: &Option<String>) -> bool {
    v.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl PredefinedUserInfo {
    pub fn has_email(&self) -> bool {
        filled(&self.email)
    }

    pub fn has_phone_number(&self) -> bool {
        filled(&self.phone_number)
    }

    /// Nombre, apellido y fecha de nacimiento presentes y no vacíos tras trim.
    pub fn has_complete_identity(&self) -> bool {
        filled(&self.first_name) && filled(&self.last_name) && filled(&self.date_of_birth)
    }

    /// `UserInfo` validado si los tres campos de identidad están completos.
    pub fn user_info(&self) -> Option<Result<UserInfo, DomainError>> {
        if !self.has_complete_identity() {
            return None;
        }
        Some(UserInfo::parse(self.first_name.as_deref().unwrap_or_default(),
                             self.last_name.as_deref().unwrap_or_default(),
                             self.date_of_birth.as_deref().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_formats_dob() {
        let info = UserInfo::parse("  Ada ", "Lovelace", "1815-12-10").unwrap();
        assert_eq!(info.first_name(), "Ada");
        assert_eq!(info.date_of_birth_wire(), "1815-12-10");
    }

    #[test]
    fn parse_rejects_bad_dates_and_blank_names() {
        assert!(UserInfo::parse("Ada", "Lovelace", "10/12/1815").is_err());
        assert!(UserInfo::parse("Ada", "Lovelace", "1815-02-30").is_err());
        assert!(UserInfo::parse(" ", "Lovelace", "1815-12-10").is_err());
    }

    #[test]
    fn complete_identity_requires_all_three_fields() {
        let mut p = PredefinedUserInfo { first_name: Some("Ada".into()),
                                         last_name: Some("Lovelace".into()),
                                         date_of_birth: Some("  ".into()),
                                         ..Default::default() };
        assert!(!p.has_complete_identity());
        assert!(p.user_info().is_none());
        p.date_of_birth = Some("1815-12-10".into());
        assert!(p.has_complete_identity());
        assert!(p.user_info().unwrap().is_ok());
    }
}
