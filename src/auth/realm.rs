//! Realm modeling and the set-semantics authorization checks built on it.

// std
use std::{cmp::Ordering, collections::BTreeSet, slice::Iter};
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Errors emitted when validating realms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RealmValidationError {
	/// Empty realm entries are not allowed.
	#[error("Realm entries cannot be empty.")]
	Empty,
	/// Realms cannot contain embedded whitespace characters.
	#[error("Realm contains whitespace: {realm}.")]
	ContainsWhitespace {
		/// The offending realm string.
		realm: String,
	},
}

/// Normalized set of realms.
///
/// Realms are deduplicated and sorted so equality, ordering, and hashing ignore the order in
/// which a client or token listed them.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RealmSet {
	realms: Arc<[String]>,
}
impl RealmSet {
	/// Creates a normalized realm set from any iterator.
	pub fn new<I, S>(realms: I) -> Result<Self, RealmValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self { realms: normalize(realms)? })
	}

	/// Number of distinct realms.
	pub fn len(&self) -> usize {
		self.realms.len()
	}

	/// Returns true if no realms are defined.
	pub fn is_empty(&self) -> bool {
		self.realms.is_empty()
	}

	/// Returns true if the normalized set contains the provided realm.
	pub fn contains(&self, realm: &str) -> bool {
		self.realms.binary_search_by(|candidate| candidate.as_str().cmp(realm)).is_ok()
	}

	/// Iterator over normalized realms.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.realms.iter().map(|s| s.as_str())
	}

	/// Space-delimited representation, the wire form of the `realm` parameter.
	pub fn normalized(&self) -> String {
		self.realms.join(" ")
	}

	/// Returns the underlying slice of realm strings.
	pub fn as_slice(&self) -> &[String] {
		&self.realms
	}

	/// `other ⊆ self`.
	pub fn is_superset_of(&self, other: &RealmSet) -> bool {
		other.iter().all(|realm| self.contains(realm))
	}

	/// `self ⊆ other`.
	pub fn is_subset_of(&self, other: &RealmSet) -> bool {
		other.is_superset_of(self)
	}

	/// Realms in `self` that `permitted` does not contain.
	pub fn difference<'a>(&'a self, permitted: &'a RealmSet) -> impl Iterator<Item = &'a str> {
		self.iter().filter(move |realm| !permitted.contains(realm))
	}
}
impl PartialOrd for RealmSet {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl Ord for RealmSet {
	fn cmp(&self, other: &Self) -> Ordering {
		self.realms.cmp(&other.realms)
	}
}
impl Debug for RealmSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("RealmSet").field(&self.realms).finish()
	}
}
impl Display for RealmSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}

/// Iterator over realm strings.
pub struct RealmIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for RealmIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|s| s.as_str())
	}
}
impl<'a> IntoIterator for &'a RealmSet {
	type IntoIter = RealmIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		RealmIter { inner: self.realms.iter() }
	}
}
impl TryFrom<Vec<String>> for RealmSet {
	type Error = RealmValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for RealmSet {
	type Err = RealmValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(RealmValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}
impl Serialize for RealmSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.realms.len()))?;

		for realm in self.realms.iter() {
			seq.serialize_element(realm)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for RealmSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		RealmSet::new(values).map_err(DeError::custom)
	}
}

fn normalize<I, S>(realms: I) -> Result<Arc<[String]>, RealmValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut set = BTreeSet::new();

	for realm in realms {
		let owned: String = realm.into();

		if owned.is_empty() {
			return Err(RealmValidationError::Empty);
		}
		if owned.chars().any(char::is_whitespace) {
			return Err(RealmValidationError::ContainsWhitespace { realm: owned });
		}

		set.insert(owned);
	}

	Ok(Arc::from(set.into_iter().collect::<Vec<_>>()))
}
