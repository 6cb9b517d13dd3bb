use std::borrow::Cow;
use std::collections::HashMap;

use regex::Regex;
use validator::ValidationError;

pub fn validate_barcode(barcode: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref BARCODE_VALIDATION_RE: Regex = Regex::new(r"^[0-9A-Za-z\-]{1,64}$").unwrap();
    }

    if BARCODE_VALIDATION_RE.is_match(barcode) {
        Ok(())
    } else {
        Err(ValidationError {
            code: Cow::from("barcode"),
            message: Some(Cow::from("Incorrect barcode format")),
            params: HashMap::new(),
        })
    }
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError {
            code: Cow::from("blank"),
            message: Some(Cow::from("Value must not be blank.")),
            params: HashMap::new(),
        })
    } else {
        Ok(())
    }
}
