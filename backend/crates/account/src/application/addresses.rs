//! Address Use Cases
//!
//! Address book management: listing, creation under a per-user limit,
//! updates, soft deletion, default selection and renaming. Every
//! operation is scoped to the owning user; someone else's address
//! behaves as if it did not exist.

use std::sync::Arc;
use uuid::Uuid;

use crate::application::config::AccountConfig;
use crate::domain::entity::{Address, AddressFields};
use crate::domain::repository::{AddressRepository, UserRepository};
use crate::domain::value_object::{AddressId, Mobile, UserId};
use crate::error::{AccountError, AccountResult};

/// Editable address fields as submitted by the client
#[derive(Debug, Clone)]
pub struct AddressInput {
    pub title: String,
    pub receiver: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub place: String,
    pub mobile: String,
    pub tel: Option<String>,
    pub email: Option<String>,
}

impl AddressInput {
    fn into_fields(self) -> AccountResult<AddressFields> {
        Ok(AddressFields {
            title: self.title,
            receiver: self.receiver,
            province: self.province,
            city: self.city,
            district: self.district,
            place: self.place,
            mobile: Mobile::new(&self.mobile)?,
            tel: self.tel,
            email: self.email,
        })
    }
}

/// Output of the address listing
pub struct AddressListOutput {
    pub user_id: Uuid,
    pub default_address_id: Option<Uuid>,
    pub limit: usize,
    pub addresses: Vec<Address>,
}

/// Address use cases
pub struct AddressesUseCase<U, A>
where
    U: UserRepository,
    A: AddressRepository,
{
    user_repo: Arc<U>,
    address_repo: Arc<A>,
    config: Arc<AccountConfig>,
}

impl<U, A> AddressesUseCase<U, A>
where
    U: UserRepository,
    A: AddressRepository,
{
    pub fn new(user_repo: Arc<U>, address_repo: Arc<A>, config: Arc<AccountConfig>) -> Self {
        Self {
            user_repo,
            address_repo,
            config,
        }
    }

    pub async fn list(&self, user_id: Uuid) -> AccountResult<AddressListOutput> {
        let user_id = UserId::from_uuid(user_id);
        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let addresses = self.address_repo.find_live_by_user(&user_id).await?;

        Ok(AddressListOutput {
            user_id: user_id.into_uuid(),
            default_address_id: user.default_address_id.map(|id| id.into_uuid()),
            limit: self.config.address_limit,
            addresses,
        })
    }

    pub async fn create(&self, user_id: Uuid, input: AddressInput) -> AccountResult<Address> {
        let user_id = UserId::from_uuid(user_id);
        let fields = input.into_fields()?;

        let count = self.address_repo.count_live_by_user(&user_id).await?;
        if count as usize >= self.config.address_limit {
            return Err(AccountError::AddressLimitExceeded);
        }

        let address = Address::new(user_id, fields);
        self.address_repo.create(&address).await?;

        tracing::info!(
            user_id = %user_id,
            address_id = %address.address_id,
            "Address created"
        );

        Ok(address)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        input: AddressInput,
    ) -> AccountResult<Address> {
        let fields = input.into_fields()?;
        let mut address = self.owned_live_address(user_id, address_id).await?;

        address.apply(fields);
        self.address_repo.update(&address).await?;

        Ok(address)
    }

    pub async fn remove(&self, user_id: Uuid, address_id: Uuid) -> AccountResult<()> {
        let mut address = self.owned_live_address(user_id, address_id).await?;

        address.soft_delete();
        self.address_repo.update(&address).await?;

        tracing::info!(address_id = %address.address_id, "Address removed");

        Ok(())
    }

    pub async fn set_default(&self, user_id: Uuid, address_id: Uuid) -> AccountResult<()> {
        let address = self.owned_live_address(user_id, address_id).await?;

        let user_id = UserId::from_uuid(user_id);
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        user.set_default_address(address.address_id);
        self.user_repo.update(&user).await?;

        Ok(())
    }

    pub async fn set_title(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        title: String,
    ) -> AccountResult<Address> {
        let mut address = self.owned_live_address(user_id, address_id).await?;

        address.rename(title);
        self.address_repo.update(&address).await?;

        Ok(address)
    }

    /// Fetch an address that belongs to the user and is not deleted
    async fn owned_live_address(
        &self,
        user_id: Uuid,
        address_id: Uuid,
    ) -> AccountResult<Address> {
        let address_id = AddressId::from_uuid(address_id);
        let address = self
            .address_repo
            .find_by_id(&address_id)
            .await?
            .ok_or(AccountError::AddressNotFound)?;

        if address.is_deleted || address.user_id.into_uuid() != user_id {
            return Err(AccountError::AddressNotFound);
        }

        Ok(address)
    }
}
