use serde::{Deserialize, Serialize};

use crate::domain::types::{BrandId, BrandName};

/// Canonical brand record.
///
/// Brands are created lazily the first time an unseen name is written and are
/// never deleted by this application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Brand {
    pub id: BrandId,
    pub name: BrandName,
}

/// Information required to create a new [`Brand`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewBrand {
    pub name: BrandName,
}
