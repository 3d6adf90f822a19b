//! BSON value classification.

use crate::models::TypeTag;
use mongodb::bson::Bson;

/// Maps a BSON value to its canonical [`TypeTag`].
///
/// Total and pure: every value classifies, classification never fails, and
/// the tag depends only on the value's runtime representation. Numeric
/// subtypes stay distinct so mixed-numeric paths are reported as such.
///
/// Deprecated BSON representations fold into the closed tag set:
/// `Symbol` counts as a string, `Undefined` as null, `DbPointer` as an
/// object reference, and code-with-scope as code.
pub fn classify(value: &Bson) -> TypeTag {
    match value {
        Bson::Null | Bson::Undefined => TypeTag::Null,
        Bson::Boolean(_) => TypeTag::Boolean,
        Bson::Int32(_) => TypeTag::Integer,
        Bson::Int64(_) => TypeTag::Long,
        Bson::Double(_) => TypeTag::Double,
        Bson::Decimal128(_) => TypeTag::Decimal,
        Bson::String(_) | Bson::Symbol(_) => TypeTag::String,
        Bson::DateTime(_) => TypeTag::Date,
        Bson::Timestamp(_) => TypeTag::Timestamp,
        Bson::ObjectId(_) | Bson::DbPointer(_) => TypeTag::ObjectId,
        Bson::Binary(_) => TypeTag::Binary,
        Bson::Array(_) => TypeTag::Array,
        Bson::Document(_) => TypeTag::Object,
        Bson::RegularExpression(_) => TypeTag::Regex,
        Bson::JavaScriptCode(_) | Bson::JavaScriptCodeWithScope(_) => TypeTag::Code,
        Bson::MinKey => TypeTag::MinKey,
        Bson::MaxKey => TypeTag::MaxKey,
    }
}
