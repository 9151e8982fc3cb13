use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use encoding::{
    decode_text, encode_text, encode_timestamp, format_timestamp, DecodeError, LABEL_ALPHABET,
};
pub use label_set::EncodedLabelSet;
pub use record::GeolocationRecord;
pub use validation::{is_valid_label_value, LABEL_VALUE_MAX_LEN};

pub mod labels;

mod encoding;
mod label_set;
mod record;
mod validation;
