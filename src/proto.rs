/*!

Wire-level contract for the freedesktop Secret Service.

This module owns the fixed protocol-contract table: the well-known bus
name, the object paths, and the interface/method/signal identifiers the
client calls against, plus the wire shape of a secret payload. Nothing
here is negotiable at runtime; the constants mirror the published
Secret Service API and must stay bit-for-bit identical to it.

Variant values (`zvariant::Value`) appear only at this boundary and in
the client internals; they are never part of the public API.

*/

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use zbus::zvariant::{ObjectPath, OwnedObjectPath, Type};

use crate::errors::{Error, Result};

// Bus name and object paths
pub(crate) const BUS_NAME: &str = "org.freedesktop.secrets";
pub(crate) const SERVICE_PATH: &str = "/org/freedesktop/secrets";
pub(crate) const DEFAULT_COLLECTION_PATH: &str = "/org/freedesktop/secrets/aliases/default";
pub(crate) const COLLECTION_PREFIX: &str = "/org/freedesktop/secrets/collection/";

// Interfaces
pub(crate) const SERVICE_IFACE: &str = "org.freedesktop.Secret.Service";
pub(crate) const COLLECTION_IFACE: &str = "org.freedesktop.Secret.Collection";
pub(crate) const ITEM_IFACE: &str = "org.freedesktop.Secret.Item";
pub(crate) const SESSION_IFACE: &str = "org.freedesktop.Secret.Session";
pub(crate) const PROMPT_IFACE: &str = "org.freedesktop.Secret.Prompt";

// Methods and signals
pub(crate) const OPEN_SESSION: &str = "OpenSession";
pub(crate) const SEARCH_ITEMS: &str = "SearchItems";
pub(crate) const UNLOCK: &str = "Unlock";
pub(crate) const CREATE_ITEM: &str = "CreateItem";
pub(crate) const GET_SECRET: &str = "GetSecret";
pub(crate) const DELETE: &str = "Delete";
pub(crate) const CLOSE: &str = "Close";
pub(crate) const PROMPT: &str = "Prompt";
pub(crate) const COMPLETED: &str = "Completed";

// Session negotiation and item properties
pub(crate) const ALGORITHM_PLAIN: &str = "plain";
pub(crate) const ITEM_LABEL_PROP: &str = "org.freedesktop.Secret.Item.Label";
pub(crate) const ITEM_ATTRIBUTES_PROP: &str = "org.freedesktop.Secret.Item.Attributes";
pub(crate) const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf8";

/// The null sentinel the service returns in place of a prompt path.
pub(crate) const NO_PROMPT: &str = "/";

// Lookup attribute keys. Every item this client creates carries exactly
// this pair, which keeps labels private to one application identity.
pub(crate) const ATTR_APPLICATION: &str = "Application";
pub(crate) const ATTR_ID: &str = "Id";

/// Wire shape of a secret payload: `(oayays)`.
///
/// The session path ties the transfer to the open session; `parameters`
/// is empty for plain-algorithm sessions.
#[derive(Clone, Debug, Deserialize, Serialize, Type)]
pub(crate) struct Secret {
    pub session: OwnedObjectPath,
    pub parameters: Vec<u8>,
    pub value: Vec<u8>,
    pub content_type: String,
}

/// The attribute pair used to create and to find an item.
pub(crate) fn lookup_attributes<'a>(application: &'a str, id: &'a str) -> HashMap<&'a str, &'a str> {
    HashMap::from([(ATTR_APPLICATION, application), (ATTR_ID, id)])
}

/// Derive the collection object path from an optional collection name.
///
/// `None` means the default alias. An explicit name lands under the
/// collection prefix and must be a valid path element.
pub(crate) fn collection_path(name: Option<&str>) -> Result<OwnedObjectPath> {
    let path = match name {
        None => DEFAULT_COLLECTION_PATH.to_string(),
        Some(name) => format!("{COLLECTION_PREFIX}{name}"),
    };
    let path = ObjectPath::try_from(path)
        .map_err(|e| Error::Invalid("collection name", e.to_string()))?;
    Ok(path.into())
}
