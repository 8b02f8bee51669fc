//! Address Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{AddressId, Mobile, UserId};

/// Editable address fields, validated at the boundary
#[derive(Debug, Clone)]
pub struct AddressFields {
    pub title: String,
    pub receiver: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub place: String,
    pub mobile: Mobile,
    pub tel: Option<String>,
    pub email: Option<String>,
}

/// Shipping address entity
///
/// Deletion is logical only; removed addresses stay in storage with
/// `is_deleted` set and never show up in listings or counts.
#[derive(Debug, Clone)]
pub struct Address {
    pub address_id: AddressId,
    pub user_id: UserId,
    pub title: String,
    pub receiver: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub place: String,
    pub mobile: Mobile,
    pub tel: Option<String>,
    pub email: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// Create a new address for a user
    pub fn new(user_id: UserId, fields: AddressFields) -> Self {
        let now = Utc::now();
        Self {
            address_id: AddressId::new(),
            user_id,
            title: fields.title,
            receiver: fields.receiver,
            province: fields.province,
            city: fields.city,
            district: fields.district,
            place: fields.place,
            mobile: fields.mobile,
            tel: fields.tel,
            email: fields.email,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace all editable fields
    pub fn apply(&mut self, fields: AddressFields) {
        self.title = fields.title;
        self.receiver = fields.receiver;
        self.province = fields.province;
        self.city = fields.city;
        self.district = fields.district;
        self.place = fields.place;
        self.mobile = fields.mobile;
        self.tel = fields.tel;
        self.email = fields.email;
        self.updated_at = Utc::now();
    }

    /// Rename the address
    pub fn rename(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    /// Soft delete
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.updated_at = Utc::now();
    }
}
