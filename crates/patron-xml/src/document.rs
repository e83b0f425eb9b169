//! Patron document building.
//!
//! Turns one [`Person`] plus the run's preloaded [`ContactIndexes`] into a
//! `<user>` element. Scalars go through [`XmlNode::push_field`], so the same
//! presence rule governs the person, every contact group and the identifiers.

use patron_common::{preferred_token, present_text, PersonKey, Value};
use patron_source::{Address, ContactIndexes, Email, Person, Phone};

use crate::{Error, Result, XmlNode};

/// Root element of an export.
pub const ROOT_TAG: &str = "users";
/// Fixed record type of every user.
pub const RECORD_TYPE: &str = "PUBLIC";
/// Fixed account type of every user.
pub const ACCOUNT_TYPE: &str = "EXTERNAL";
/// Identifier type for the library barcode.
pub const BARCODE_ID_TYPE: &str = "01";
/// Identifier type for the institutional ID.
pub const PRIMARY_ID_TYPE: &str = "02";
/// Role status.
pub const ROLE_STATUS: &str = "ACTIVE";
/// Role scope (institution code).
pub const ROLE_SCOPE: &str = "61UNI_ACU";
/// Role type code.
pub const ROLE_TYPE: &str = "200";

/// Builds user documents against one run's contact indexes.
#[derive(Debug, Clone, Copy)]
pub struct DocumentBuilder<'a> {
    contacts: &'a ContactIndexes,
}

/// Result of building every person in a run.
#[derive(Debug)]
pub struct BatchDocument {
    /// The `<users>` root holding every document that built.
    pub root: XmlNode,
    /// Number of `<user>` elements under the root.
    pub built: usize,
    /// Records that failed, in input order.
    pub failures: Vec<Error>,
}

impl<'a> DocumentBuilder<'a> {
    /// Create a builder over preloaded contacts.
    pub fn new(contacts: &'a ContactIndexes) -> Self {
        Self { contacts }
    }

    /// Build the `<user>` element for one person.
    pub fn build(&self, person: &Person) -> Result<XmlNode> {
        let key = PersonKey::from_value(&person.pidm).map_err(|source| Error::Build {
            record: record_label(person),
            source,
        })?;

        let mut user = XmlNode::new("user");
        user.push(XmlNode::with_text("record_type", RECORD_TYPE));
        user.push_field("primary_id", &person.spriden_id);
        user.push_field("first_name", &person.first_name);
        user.push_field("middle_name", &person.middle_name);
        user.push_field("last_name", &person.last_name);
        user.push_field("full_name", &person.full_name);
        user.push_field("user_title", &person.user_title);
        user.push_field("gender", &person.gender);
        user.push_field("user_group", &person.user_group);
        user.push_field("campus_code", &person.campus_code);
        user.push_field("preferred_language", &person.preferred_language);
        user.push_field("birth_date", &person.birth_date);
        user.push_field("expiry_date", &person.expiry_date);
        user.push_field("purge_date", &person.purge_date);
        user.push(XmlNode::with_text("account_type", ACCOUNT_TYPE));
        user.push_field("external_id", &person.spriden_id);
        user.push_field("status", &person.status);

        user.push(
            XmlNode::new("contact_info")
                .child(
                    XmlNode::new("addresses")
                        .children(self.contacts.addresses.get(key).iter().map(address_node)),
                )
                .child(
                    XmlNode::new("emails")
                        .children(self.contacts.emails.get(key).iter().map(email_node)),
                )
                .child(
                    XmlNode::new("phones")
                        .children(self.contacts.phones.get(key).iter().map(phone_node)),
                ),
        );

        user.push(identifiers_node(person));
        user.push(role_block());

        Ok(user)
    }

    /// Build every person, isolating failures to the record that caused them.
    pub fn build_all(&self, persons: &[Person]) -> BatchDocument {
        let mut root = XmlNode::new(ROOT_TAG);
        let mut failures = Vec::new();

        for person in persons {
            match self.build(person) {
                Ok(user) => root.push(user),
                Err(e) => {
                    log::error!("{}", e);
                    failures.push(e);
                }
            }
        }

        let built = root.children.len();
        BatchDocument {
            root,
            built,
            failures,
        }
    }
}

fn record_label(person: &Person) -> String {
    let pidm = match &person.pidm {
        Value::Null => "NULL".to_string(),
        other => other.to_string(),
    };
    match present_text(&person.spriden_id) {
        Some(id) => format!("pidm={} id={}", pidm, id),
        None => format!("pidm={}", pidm),
    }
}

/// Start a repeated group, attaching `preferred` only for truthy flags.
fn group(tag: &str, preferred: &Value) -> XmlNode {
    let node = XmlNode::new(tag);
    match preferred_token(preferred) {
        Some(token) => node.attr("preferred", token),
        None => node,
    }
}

/// Append `<{list}><{item}>type</{item}></{list}>` when the type is present.
fn push_type(node: &mut XmlNode, list: &str, item: &str, value: &Value) {
    if present_text(value).is_some() {
        let mut types = XmlNode::new(list);
        types.push_field(item, value);
        node.push(types);
    }
}

fn address_node(address: &Address) -> XmlNode {
    let mut node = group("address", &address.preferred);
    node.push_field("line1", &address.line1);
    node.push_field("line2", &address.line2);
    node.push_field("line3", &address.line3);
    node.push_field("city", &address.city);
    node.push_field("state_province", &address.state_province);
    node.push_field("postal_code", &address.postal_code);
    push_type(&mut node, "address_types", "address_type", &address.address_type);
    node.push_field("start_date", &address.start_date);
    node.push_field("end_date", &address.end_date);
    node
}

fn email_node(email: &Email) -> XmlNode {
    let mut node = group("email", &email.preferred);
    node.push_field("email_address", &email.address);
    push_type(&mut node, "email_types", "email_type", &email.email_type);
    node
}

fn phone_node(phone: &Phone) -> XmlNode {
    let mut node = group("phone", &phone.preferred);
    node.push_field("phone_number", &phone.number);
    push_type(&mut node, "phone_types", "phone_type", &phone.phone_type);
    node
}

fn identifiers_node(person: &Person) -> XmlNode {
    let mut identifiers = XmlNode::new("user_identifiers");
    for (id_type, value) in [
        (BARCODE_ID_TYPE, &person.barcode),
        (PRIMARY_ID_TYPE, &person.spriden_id),
    ] {
        if present_text(value).is_some() {
            let mut entry =
                XmlNode::new("user_identifier").child(XmlNode::with_text("id_type", id_type));
            entry.push_field("value", value);
            identifiers.push(entry);
        }
    }
    identifiers
}

/// The fixed role block shared by every user.
pub fn role_block() -> XmlNode {
    XmlNode::new("user_roles").child(
        XmlNode::new("user_role")
            .child(XmlNode::with_text("status", ROLE_STATUS))
            .child(XmlNode::with_text("scope", ROLE_SCOPE))
            .child(XmlNode::with_text("role_type", ROLE_TYPE))
            .child(
                XmlNode::new("parameters").child(
                    XmlNode::new("parameter")
                        .child(XmlNode::new("type"))
                        .child(XmlNode::new("value")),
                ),
            ),
    )
}
