//! User request/response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationErrors};

use crate::models::{Address, User};
use crate::utils::validation::{field_error, is_valid_phone_number};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressDto {
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line3: Option<String>,
    pub town: String,
    pub county: String,
    pub postcode: String,
}

impl AddressDto {
    fn collect_errors(&self, errors: &mut ValidationErrors) {
        if self.line1.trim().is_empty() {
            errors.add("address.line1", field_error("blank", "Line 1 must not be blank"));
        }
        if self.town.trim().is_empty() {
            errors.add("address.town", field_error("blank", "Town must not be blank"));
        }
        if self.county.trim().is_empty() {
            errors.add("address.county", field_error("blank", "County must not be blank"));
        }
        if self.postcode.trim().is_empty() {
            errors.add(
                "address.postcode",
                field_error("blank", "Postcode must not be blank"),
            );
        }
    }
}

impl From<AddressDto> for Address {
    fn from(dto: AddressDto) -> Self {
        Address {
            line1: dto.line1,
            line2: dto.line2,
            line3: dto.line3,
            town: dto.town,
            county: dto.county,
            postcode: dto.postcode,
        }
    }
}

impl From<Address> for AddressDto {
    fn from(address: Address) -> Self {
        AddressDto {
            line1: address.line1,
            line2: address.line2,
            line3: address.line3,
            town: address.town,
            county: address.county,
            postcode: address.postcode,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub address: AddressDto,
    pub phone_number: String,
    pub email: String,
    pub password: String,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", field_error("blank", "Name must not be blank"));
        }
        self.address.collect_errors(&mut errors);
        if !is_valid_phone_number(&self.phone_number) {
            errors.add(
                "phoneNumber",
                field_error("pattern", "Phone number must be in E.164 format"),
            );
        }
        if !self.email.validate_email() {
            errors.add("email", field_error("email", "Invalid email format"));
        }
        if self.password.len() < 8 {
            errors.add(
                "password",
                field_error("length", "Password must be at least 8 characters"),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub address: Option<AddressDto>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(address) = &self.address {
            address.collect_errors(&mut errors);
        }
        if let Some(phone_number) = &self.phone_number {
            if !is_valid_phone_number(phone_number) {
                errors.add(
                    "phoneNumber",
                    field_error("pattern", "Phone number must be in E.164 format"),
                );
            }
        }
        if let Some(email) = &self.email {
            if !email.validate_email() {
                errors.add("email", field_error("email", "Invalid email format"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub address: AddressDto,
    pub phone_number: String,
    pub email: String,
    pub created_timestamp: DateTime<Utc>,
    pub updated_timestamp: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            address: user.address.into(),
            phone_number: user.phone_number,
            email: user.email,
            created_timestamp: user.created_timestamp,
            updated_timestamp: user.updated_timestamp,
        }
    }
}
