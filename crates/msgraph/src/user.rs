//! The Graph `user` resource
//!
//! See: <https://learn.microsoft.com/en-us/graph/api/resources/user>
//!
//! Scalar properties are [`Nullable`] so a caller can tell a property the
//! server omitted (for example because of `$select`) from one it returned
//! as `null`. Collections the API documents as non-nullable are plain
//! `Vec`s that default to empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::GraphApi;
use crate::nullable::Nullable;
use crate::query::{Query, QueryOption};
use crate::resource::{ApiVersion, Resource, ResourceRegistry};
use crate::{GraphError, Result};

/// Registry name of the v1.0 `users` collection
pub const USER_RESOURCE: &str = "UserV1";

/// Registers the resources this module uses
pub fn register(registry: &mut ResourceRegistry) {
    registry.register(Resource::new(USER_RESOURCE, ApiVersion::V1, "users"));
}

// ============================================================================
// Complex types
// ============================================================================

/// A license assigned to a user
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignedLicense {
    /// Identifiers of the plans that have been disabled
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled_plans: Vec<String>,

    /// Identifier of the SKU
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub sku_id: Nullable<String>,
}

/// A service plan assigned to a user
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignedPlan {
    /// When the plan was assigned, in UTC
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub assigned_date_time: Nullable<DateTime<Utc>>,

    /// For example, `Enabled`
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub capability_status: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub service: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub service_plan_id: Nullable<String>,
}

/// Password settings of a user
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PasswordProfile {
    /// Whether the user must change their password at next sign-in
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub force_change_password_next_sign_in: Nullable<bool>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub password: Nullable<String>,
}

/// A service plan provisioned for a user
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProvisionedPlan {
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub capability_status: Nullable<String>,

    /// For example, `Success`
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub provisioning_status: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub service: Nullable<String>,
}

// ============================================================================
// User
// ============================================================================

/// A directory user
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub about_me: Nullable<String>,

    /// Whether the account is enabled
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub account_enabled: Nullable<bool>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assigned_licenses: Vec<AssignedLicense>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assigned_plans: Vec<AssignedPlan>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub birthday: Nullable<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub business_phones: Vec<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub city: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub country: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub department: Nullable<String>,

    /// Name shown in the address book
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub display_name: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub given_name: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub hire_date: Nullable<DateTime<Utc>>,

    /// Unique identifier. Read-only.
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub id: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub interests: Nullable<Vec<String>>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub job_title: Nullable<String>,

    /// SMTP address. Read-only.
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub mail: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub mail_nickname: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub mobile_phone: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub my_site: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub office_location: Nullable<String>,

    /// Links an on-premises Active Directory account to this user
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub on_premises_immutable_id: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub on_premises_last_sync_date_time: Nullable<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub on_premises_security_identifier: Nullable<String>,

    /// `true` while synced from on-premises, `false` once no longer synced,
    /// `null` if never synced
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub on_premises_sync_enabled: Nullable<bool>,

    /// For example, `DisablePasswordExpiration,DisableStrongPassword`
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub password_policies: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub password_profile: Nullable<PasswordProfile>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub past_projects: Nullable<Vec<String>>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub postal_code: Nullable<String>,

    /// ISO 639-1 code, e.g. `en-US`
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub preferred_language: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub preferred_name: Nullable<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provisioned_plans: Vec<ProvisionedPlan>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proxy_addresses: Vec<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub responsibilities: Nullable<Vec<String>>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub schools: Nullable<Vec<String>>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub skills: Nullable<Vec<String>>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub state: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub street_address: Nullable<String>,

    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub surname: Nullable<String>,

    /// Two-letter country code (ISO 3166)
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub usage_location: Nullable<String>,

    /// Internet-style sign-in name, e.g. `alias@contoso.com`
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub user_principal_name: Nullable<String>,

    /// For example, `Member` or `Guest`
    #[serde(skip_serializing_if = "Nullable::is_absent")]
    pub user_type: Nullable<String>,
}

// ============================================================================
// Operations
// ============================================================================

impl GraphApi {
    /// Retrieves a user by ID or user principal name
    ///
    /// When `properties` is non-empty only those properties are requested
    /// (`$select`); the rest stay [`Nullable::Absent`] in the result.
    ///
    /// # Errors
    /// - [`GraphError::Configuration`] if `id` is empty, credentials are
    ///   missing or the user resource is not registered
    /// - [`GraphError::Token`] if no access token can be obtained
    /// - [`GraphError::Transport`] if the request fails or returns an error status
    /// - [`GraphError::Decoding`] if the body is not a user
    pub async fn get_user(&self, id: &str, properties: &[&str]) -> Result<User> {
        if id.trim().is_empty() {
            return Err(GraphError::Configuration("User ID must be set".to_string()));
        }
        client_debug!(self, user = %id, "Getting user from Graph API");

        let mut url = self.registered_endpoint(USER_RESOURCE)?;
        let endpoint = url.to_string();
        url.path_segments_mut()
            .map_err(|()| GraphError::Configuration(format!("{} cannot carry a path", endpoint)))?
            .push(id);

        if !properties.is_empty() {
            let mut query = Query::new();
            query.add_option(QueryOption::select(properties.iter().copied()));
            query.apply_to(&mut url);
        }

        self.get_json(url).await
    }
}
