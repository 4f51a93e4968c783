//! Typed slug wrappers for compile-time type safety.
//!
//! Civic entities are keyed by caller-assigned, case-sensitive string slugs
//! (`"housing"`, `"city-council"`, `"measure-env-1"`). `Id<T>` wraps such a slug
//! so that an `OfficeId` can never be passed where an `IssueId` was expected.
//!
//! # Example
//!
//! ```rust
//! use civic_core::common::id::Id;
//!
//! pub struct Issue;
//! pub struct Office;
//!
//! let issue: Id<Issue> = Id::new("housing");
//! let office: Id<Office> = Id::new("city-council");
//!
//! assert_eq!(issue.as_str(), "housing");
//! // let wrong: Id<Office> = issue; // compile error
//! # let _ = office;
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

/// A typed wrapper around a string slug.
///
/// The type parameter `T` represents the entity type this ID belongs to.
/// Equality, ordering and hashing all delegate to the inner string, so an
/// `Id<T>` can be looked up in a map by `&str`.
#[repr(transparent)]
pub struct Id<T>(String, PhantomData<fn() -> T>);

// ============================================================================
// Core implementations
// ============================================================================

impl<T> Id<T> {
    /// Creates an `Id` from anything string-like.
    #[inline]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into(), PhantomData)
    }

    /// Returns the slug.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the inner `String`.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns `true` if the slug is empty or whitespace only.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

// ============================================================================
// Standard trait implementations
// ============================================================================

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone(), PhantomData)
    }
}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = std::any::type_name::<T>();
        let short = type_name.rsplit("::").next().unwrap_or(type_name);
        f.debug_tuple(&format!("Id<{}>", short))
            .field(&self.0)
            .finish()
    }
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for Id<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for Id<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> Borrow<str> for Id<T> {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<T> AsRef<str> for Id<T> {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<T> From<String> for Id<T> {
    #[inline]
    fn from(slug: String) -> Self {
        Self::new(slug)
    }
}

impl<T> From<&str> for Id<T> {
    #[inline]
    fn from(slug: &str) -> Self {
        Self::new(slug)
    }
}

impl<T> From<Id<T>> for String {
    #[inline]
    fn from(id: Id<T>) -> Self {
        id.0
    }
}

impl<T> FromStr for Id<T> {
    type Err = std::convert::Infallible;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

// ============================================================================
// Serde support
// ============================================================================

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

// ============================================================================
// sqlx support (always enabled)
// ============================================================================

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgHasArrayType, PgTypeInfo, PgValueRef, Postgres};
use sqlx::{Decode, Encode, Type};

impl<T> Type<Postgres> for Id<T> {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<T> PgHasArrayType for Id<T> {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}

impl<T> Encode<'_, Postgres> for Id<T> {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <String as Encode<Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<T> Decode<'_, Postgres> for Id<T> {
    fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
        <String as Decode<Postgres>>::decode(value).map(Self::new)
    }
}

// ============================================================================
// Tests
// ============================================================================
