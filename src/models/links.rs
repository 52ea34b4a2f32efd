//! Ticket relationship models for the RT API.

use serde::{Deserialize, Serialize};

use super::{null_as_default, Hyperlink, LinkRef};

/// The links document RT returns for a ticket.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireLinks {
    #[serde(rename = "_hyperlinks", alias = "links", default, deserialize_with = "null_as_default")]
    pub hyperlinks: Vec<Hyperlink>,
}

/// All relationships of one ticket, grouped by kind.
///
/// Every group is present, empty when the ticket has no such link.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TicketLinks {
    /// Ticket the links belong to.
    pub ticket_id: u64,
    /// Tickets this one depends on.
    pub depends_on: Vec<LinkRef>,
    /// Tickets that depend on this one.
    pub depended_on_by: Vec<LinkRef>,
    /// Tickets or URIs this one refers to.
    pub refers_to: Vec<LinkRef>,
    /// Tickets or URIs referring to this one.
    pub referred_to_by: Vec<LinkRef>,
    /// Child tickets.
    pub members: Vec<LinkRef>,
    /// Parent tickets.
    pub member_of: Vec<LinkRef>,
}

impl TicketLinks {
    /// Groups RT hyperlinks by relationship, preserving their order.
    ///
    /// Links that are not ticket relationships (`self`, `history`, ...) are ignored.
    pub(crate) fn from_wire(ticket_id: u64, wire: &WireLinks) -> Self {
        let mut links = Self {
            ticket_id,
            ..Self::default()
        };

        for link in &wire.hyperlinks {
            let bucket = match link.relation.as_deref() {
                Some("depends-on") => &mut links.depends_on,
                Some("depended-on-by") => &mut links.depended_on_by,
                Some("refers-to") => &mut links.refers_to,
                Some("referred-to-by") => &mut links.referred_to_by,
                Some("has-member" | "members" | "child") => &mut links.members,
                Some("member-of" | "parent") => &mut links.member_of,
                _ => continue,
            };
            bucket.push(LinkRef::from(link));
        }

        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_links_grouped_by_relation() {
        let wire: WireLinks = serde_json::from_value(json!({
            "id": 42,
            "_hyperlinks": [
                {"ref": "self", "type": "ticket", "id": 42},
                {"ref": "depends-on", "type": "ticket", "id": 10},
                {"ref": "depends-on", "type": "ticket", "id": 11},
                {"ref": "parent", "type": "ticket", "id": 1},
                {"ref": "child", "type": "ticket", "id": 50},
                {"ref": "refers-to", "type": "external", "_url": "https://example.com/doc"}
            ]
        }))
        .unwrap();

        let links = TicketLinks::from_wire(42, &wire);
        let ids: Vec<_> = links.depends_on.iter().map(|l| l.id.clone()).collect();
        assert_eq!(ids, vec![Some("10".to_string()), Some("11".to_string())]);
        assert_eq!(links.member_of.len(), 1);
        assert_eq!(links.members.len(), 1);
        assert_eq!(links.refers_to[0].url.as_deref(), Some("https://example.com/doc"));
        assert!(links.depended_on_by.is_empty());
    }

    #[test]
    fn test_links_empty_document() {
        let wire: WireLinks = serde_json::from_value(json!({})).unwrap();
        let out = serde_json::to_value(TicketLinks::from_wire(42, &wire)).unwrap();
        assert_eq!(
            out,
            json!({
                "ticket_id": 42,
                "depends_on": [],
                "depended_on_by": [],
                "refers_to": [],
                "referred_to_by": [],
                "members": [],
                "member_of": []
            })
        );
    }
}
