use diesel::prelude::*;

use crate::domain::brand::{Brand as DomainBrand, NewBrand as DomainNewBrand};
use crate::domain::types::{BrandName, TypeConstraintError};

/// Diesel model representing the `brands` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::brands)]
pub struct Brand {
    pub id: i32,
    pub name: String,
}

/// Insertable form of [`Brand`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::brands)]
pub struct NewBrand {
    pub name: String,
}

impl TryFrom<Brand> for DomainBrand {
    type Error = TypeConstraintError;

    fn try_from(brand: Brand) -> Result<Self, Self::Error> {
        Ok(Self {
            id: brand.id.try_into()?,
            name: BrandName::new(brand.name)?,
        })
    }
}

impl From<DomainNewBrand> for NewBrand {
    fn from(brand: DomainNewBrand) -> Self {
        Self {
            name: brand.name.into_inner(),
        }
    }
}
