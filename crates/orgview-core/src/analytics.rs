//! Read-only folds over a raw hierarchy.
//!
//! These run once per person selection and never look at expansion state.

use crate::person::PersonNode;
use crate::relationship::{ConnectionCounts, Relationship};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Representative values that mean "nobody".
const NO_REPRESENTATIVE: [&str; 3] = ["", "No", "N/A"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSummary {
    pub name: String,
    pub position: String,
    pub department: String,
    pub location: String,
}

impl ContactSummary {
    fn from_node(node: &PersonNode) -> Self {
        Self {
            name: node.name.clone(),
            position: node.position.clone(),
            department: node.department.clone(),
            location: node.display_location().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessOpportunityStats {
    pub counts: ConnectionCounts,
    pub total: usize,
    /// People with a direct connection, in pre-order.
    pub high_priority_contacts: Vec<ContactSummary>,
    /// People with an indirect connection, in pre-order.
    pub opportunities: Vec<ContactSummary>,
}

/// Headline shown above the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityBanner {
    SalesAlert { direct: usize },
    BusinessDevelopment { indirect: usize },
}

impl OpportunityBanner {
    pub fn message(&self) -> String {
        match *self {
            OpportunityBanner::SalesAlert { direct } => format!(
                "SALES OPPORTUNITY ALERT! You have {direct} direct connection{} in this team - \
                 Perfect for sales introductions!",
                plural(direct)
            ),
            OpportunityBanner::BusinessDevelopment { indirect } => format!(
                "BUSINESS DEVELOPMENT OPPORTUNITY! {indirect} indirect connection{} found - \
                 Consider warm introductions for sales outreach.",
                plural(indirect)
            ),
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count > 1 { "s" } else { "" }
}

impl BusinessOpportunityStats {
    pub fn banner(&self) -> Option<OpportunityBanner> {
        if self.counts.direct > 0 {
            Some(OpportunityBanner::SalesAlert {
                direct: self.counts.direct,
            })
        } else if self.counts.indirect > 0 {
            Some(OpportunityBanner::BusinessDevelopment {
                indirect: self.counts.indirect,
            })
        } else {
            None
        }
    }
}

pub fn analyze_business_opportunities(root: &PersonNode) -> BusinessOpportunityStats {
    let mut stats = BusinessOpportunityStats::default();
    for node in root.walk() {
        stats.total += 1;
        stats.counts.record(node.relationship_with_qt);
        match node.relationship_with_qt {
            Relationship::Direct => stats
                .high_priority_contacts
                .push(ContactSummary::from_node(node)),
            Relationship::Indirect => stats.opportunities.push(ContactSummary::from_node(node)),
            Relationship::None => {}
        }
    }
    stats
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionConnection {
    pub name: String,
    pub position: String,
    pub department: String,
    pub location: String,
    pub relationship: Relationship,
}

/// A representative together with everyone in the tree they vouch for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub name: String,
    pub connections: Vec<ChampionConnection>,
    pub total_connections: usize,
    pub direct_connections: usize,
    pub indirect_connections: usize,
}

impl Champion {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            connections: Vec::new(),
            total_connections: 0,
            direct_connections: 0,
            indirect_connections: 0,
        }
    }

    pub fn is_connected(&self, person: &str) -> bool {
        self.connections.iter().any(|c| c.name == person)
    }

    pub fn initials(&self) -> String {
        initials(&self.name, usize::MAX)
    }
}

/// Whether a `representative_from_qt` value names an actual person.
pub fn is_representative(value: Option<&str>) -> bool {
    value.is_some_and(|v| !NO_REPRESENTATIVE.contains(&v))
}

/// Champions sorted by total connections, descending. Ties keep first-seen order.
pub fn analyze_representatives(root: &PersonNode) -> Vec<Champion> {
    let mut order: Vec<Champion> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for node in root.walk() {
        let Some(rep) = node
            .representative_from_qt
            .as_deref()
            .filter(|rep| is_representative(Some(*rep)))
        else {
            continue;
        };

        let slot = *index.entry(rep.to_string()).or_insert_with(|| {
            order.push(Champion::new(rep));
            order.len() - 1
        });
        let champion = &mut order[slot];

        match node.relationship_with_qt {
            Relationship::Direct => champion.direct_connections += 1,
            Relationship::Indirect => champion.indirect_connections += 1,
            Relationship::None => {}
        }
        champion.connections.push(ChampionConnection {
            name: node.name.clone(),
            position: node.position.clone(),
            department: node.department.clone(),
            location: node.display_location().to_string(),
            relationship: node.relationship_with_qt,
        });
        champion.total_connections += 1;
    }

    // Stable sort keeps first-seen order among equal totals.
    order.sort_by(|a, b| b.total_connections.cmp(&a.total_connections));
    order
}

/// Upper-cased first letters of the first `max` words of a name.
pub fn initials(name: &str, max: usize) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(max)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> PersonNode {
        PersonNode::new("Sarah Williams")
            .with_relationship(Relationship::Direct)
            .with_representative("Mayank")
            .with_child(
                PersonNode::new("James Thompson")
                    .with_relationship(Relationship::Direct)
                    .with_representative("Mayank")
                    .with_child(
                        PersonNode::new("Oliver Davis")
                            .with_relationship(Relationship::Indirect)
                            .with_representative("Lihi"),
                    )
                    .with_child(PersonNode::new("Liam Brown").with_representative("No")),
            )
            .with_child(
                PersonNode::new("Klaus Mueller")
                    .with_relationship(Relationship::Direct)
                    .with_representative("Lihi")
                    .with_location("Berlin"),
            )
            .with_child(
                PersonNode::new("Hans Weber")
                    .with_relationship(Relationship::Indirect)
                    .with_representative("Mayank"),
            )
    }

    #[test]
    fn test_business_opportunity_counts() {
        let stats = analyze_business_opportunities(&sample_tree());
        assert_eq!(stats.total, 6);
        assert_eq!(stats.counts.direct, 3);
        assert_eq!(stats.counts.indirect, 2);
        assert_eq!(stats.counts.none, 1);
        assert_eq!(stats.high_priority_contacts[0].name, "Sarah Williams");
        assert_eq!(stats.high_priority_contacts[0].location, "Unknown");
        assert_eq!(stats.high_priority_contacts[2].location, "Berlin");
        assert_eq!(
            stats.banner(),
            Some(OpportunityBanner::SalesAlert { direct: 3 })
        );
    }

    #[test]
    fn test_banner_falls_back_to_business_development() {
        let tree = PersonNode::new("Solo").with_relationship(Relationship::Indirect);
        let banner = analyze_business_opportunities(&tree).banner();
        assert_eq!(
            banner,
            Some(OpportunityBanner::BusinessDevelopment { indirect: 1 })
        );
        assert!(banner.unwrap().message().contains("1 indirect connection found"));

        let nobody = PersonNode::new("Nobody");
        assert_eq!(analyze_business_opportunities(&nobody).banner(), None);
    }

    #[test]
    fn test_champions_sorted_by_total_connections() {
        let champions = analyze_representatives(&sample_tree());
        let names: Vec<_> = champions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Mayank", "Lihi"]);

        let mayank = &champions[0];
        assert_eq!(mayank.total_connections, 3);
        assert_eq!(mayank.direct_connections, 2);
        assert_eq!(mayank.indirect_connections, 1);
        assert!(mayank.is_connected("Hans Weber"));
        assert!(!mayank.is_connected("Liam Brown"));
    }

    #[test]
    fn test_placeholder_representatives_are_ignored() {
        assert!(!is_representative(None));
        assert!(!is_representative(Some("")));
        assert!(!is_representative(Some("No")));
        assert!(!is_representative(Some("N/A")));
        assert!(is_representative(Some("Dennis")));
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("Sarah Williams", 2), "SW");
        assert_eq!(initials("maria de la cruz", 2), "MD");
        assert_eq!(initials("", 2), "");
    }
}
