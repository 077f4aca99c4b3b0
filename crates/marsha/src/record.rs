use marsha_cbor::FastCodec;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record type that can be marshaled through a [`crate::Marshaler`].
///
/// Types with a precompiled codec expose it through the two accessors; the default is the
/// ruleset path only.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
	fn as_fast_codec(&self) -> Option<&dyn FastCodec> {
		None
	}

	fn as_fast_codec_mut(&mut self) -> Option<&mut dyn FastCodec> {
		None
	}
}

/// An ordered, growable collection of records.
pub trait RecordSeq {
	type Item: Record;

	fn records(&self) -> &[Self::Item];

	/// A fresh, empty record to decode the next element into.
	fn new_record(&self) -> Self::Item;

	fn append(&mut self, record: Self::Item);
}

impl<T: Record + Default> RecordSeq for Vec<T> {
	type Item = T;

	fn records(&self) -> &[T] {
		self
	}

	fn new_record(&self) -> T {
		T::default()
	}

	fn append(&mut self, record: T) {
		self.push(record);
	}
}
