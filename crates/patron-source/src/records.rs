//! Typed records, one per query shape.
//!
//! Values are kept as raw [`Value`]s; presence and formatting rules are
//! applied later, in one place, when the export document is built.

use patron_common::Value;

use crate::executor::{Fields, FromRow};
use crate::{Query, Result};

/// A child row that belongs to a person (or another grouping key).
pub trait ChildRow: FromRow {
    /// The owning key exactly as the source returned it.
    fn owner(&self) -> &Value;
}

/// One person from the changed-students view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub pidm: Value,
    pub spriden_id: Value,
    pub first_name: Value,
    pub middle_name: Value,
    pub last_name: Value,
    pub full_name: Value,
    pub user_title: Value,
    pub gender: Value,
    pub user_group: Value,
    pub campus_code: Value,
    pub preferred_language: Value,
    pub birth_date: Value,
    pub expiry_date: Value,
    pub purge_date: Value,
    pub barcode: Value,
    pub status: Value,
}

impl Person {
    /// Person query, optionally restricted to a list of PIDMs.
    pub fn query_for(pidms: Option<&[Value]>) -> Query {
        let query = Self::query();
        match pidms {
            Some(pidms) => query.filter_in("SPRIDEN_PIDM", pidms.to_vec()),
            None => query,
        }
    }
}

impl FromRow for Person {
    const TABLE: &'static str = "ALMA_STUDENT_CHANGED";
    const COLUMNS: &'static [&'static str] = &[
        "SPRIDEN_PIDM",
        "SPRIDEN_ID",
        "SPRIDEN_FIRST_NAME",
        "SPRIDEN_MI",
        "SPRIDEN_LAST_NAME",
        "USER_NAME",
        "USER_TITLE",
        "GENDER",
        "USER_GROUP",
        "CAMPUS_CODE",
        "PREFERRED_LANGUAGE",
        "USER_BIRTH_DATE",
        "EXPIRY_DATE",
        "PURGE_DATE",
        "BARCODE",
        "STATUS",
    ];

    fn from_row(f: &mut Fields) -> Result<Self> {
        Ok(Self {
            pidm: f.next_value(),
            spriden_id: f.next_value(),
            first_name: f.next_value(),
            middle_name: f.next_value(),
            last_name: f.next_value(),
            full_name: f.next_value(),
            user_title: f.next_value(),
            gender: f.next_value(),
            user_group: f.next_value(),
            campus_code: f.next_value(),
            preferred_language: f.next_value(),
            birth_date: f.next_value(),
            expiry_date: f.next_value(),
            purge_date: f.next_value(),
            barcode: f.next_value(),
            status: f.next_value(),
        })
    }
}

/// A mailing address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub pidm: Value,
    pub preferred: Value,
    pub line1: Value,
    pub line2: Value,
    pub line3: Value,
    pub city: Value,
    pub state_province: Value,
    pub postal_code: Value,
    pub address_type: Value,
    pub start_date: Value,
    pub end_date: Value,
}

impl FromRow for Address {
    const TABLE: &'static str = "ALMA_ADDRESS_MA";
    const COLUMNS: &'static [&'static str] = &[
        "SPRADDR_PIDM",
        "PREFERRED",
        "SPRADDR_STREET_LINE1",
        "SPRADDR_STREET_LINE2",
        "SPRADDR_STREET_LINE3",
        "SPRADDR_CITY",
        "SPRADDR_STAT_CODE",
        "SPRADDR_ZIP",
        "ADDRESS_TYPE",
        "START_DATE",
        "END_DATE",
    ];

    fn from_row(f: &mut Fields) -> Result<Self> {
        Ok(Self {
            pidm: f.next_value(),
            preferred: f.next_value(),
            line1: f.next_value(),
            line2: f.next_value(),
            line3: f.next_value(),
            city: f.next_value(),
            state_province: f.next_value(),
            postal_code: f.next_value(),
            address_type: f.next_value(),
            start_date: f.next_value(),
            end_date: f.next_value(),
        })
    }
}

impl ChildRow for Address {
    fn owner(&self) -> &Value {
        &self.pidm
    }
}

/// An email address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Email {
    pub pidm: Value,
    pub preferred: Value,
    pub address: Value,
    pub email_type: Value,
}

impl FromRow for Email {
    const TABLE: &'static str = "ALMA_EMAIL";
    const COLUMNS: &'static [&'static str] =
        &["EMAIL_PIDM", "PREFERRED", "EMAIL_ADDRESS", "EMAIL_TYPE"];

    fn from_row(f: &mut Fields) -> Result<Self> {
        Ok(Self {
            pidm: f.next_value(),
            preferred: f.next_value(),
            address: f.next_value(),
            email_type: f.next_value(),
        })
    }
}

impl ChildRow for Email {
    fn owner(&self) -> &Value {
        &self.pidm
    }
}

/// A phone number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Phone {
    pub pidm: Value,
    pub preferred: Value,
    pub number: Value,
    pub phone_type: Value,
}

impl FromRow for Phone {
    const TABLE: &'static str = "ALMA_PHONE_HOME";
    const COLUMNS: &'static [&'static str] =
        &["PHONE_PIDM", "PREFERRED", "PHONE_NUMBER", "PHONE_TYPE"];

    fn from_row(f: &mut Fields) -> Result<Self> {
        Ok(Self {
            pidm: f.next_value(),
            preferred: f.next_value(),
            number: f.next_value(),
            phone_type: f.next_value(),
        })
    }
}

impl ChildRow for Phone {
    fn owner(&self) -> &Value {
        &self.pidm
    }
}

/// Segment number of header lines in the flat-line view.
pub const HEADER_SEGMENT: i64 = 0;
/// Segment number of body lines in the flat-line view.
pub const BODY_SEGMENT: i64 = 1;

/// One pre-formatted output line, grouped by its segment number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatLine {
    pub segment: Value,
    pub text: Value,
}

impl FlatLine {
    /// Header and body lines in one statement.
    pub fn query_segments() -> Query {
        Self::query().filter_in(
            "LINE_NO",
            vec![Value::Integer(HEADER_SEGMENT), Value::Integer(BODY_SEGMENT)],
        )
    }
}

impl FromRow for FlatLine {
    const TABLE: &'static str = "ACU.SZBSFTP3";
    const COLUMNS: &'static [&'static str] = &["LINE_NO", "SFTP_LINE"];

    fn from_row(f: &mut Fields) -> Result<Self> {
        Ok(Self {
            segment: f.next_value(),
            text: f.next_value(),
        })
    }
}

impl ChildRow for FlatLine {
    fn owner(&self) -> &Value {
        &self.segment
    }
}

/// The file name the source schedules for the next upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadFileName {
    pub file_name: Value,
}

impl UploadFileName {
    /// Only entries scheduled for `put`.
    pub fn query_put() -> Query {
        Self::query().filter_eq("FILE_TYPE", "put")
    }
}

impl FromRow for UploadFileName {
    const TABLE: &'static str = "ACU.SZBSFTP0";
    const COLUMNS: &'static [&'static str] = &["FILE_NAME"];

    fn from_row(f: &mut Fields) -> Result<Self> {
        Ok(Self {
            file_name: f.next_value(),
        })
    }
}
