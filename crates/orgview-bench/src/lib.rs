use orgview_core::{PersonNode, Relationship};

const LOCATIONS: &[&str] = &["London", "Berlin", "Munich", "New York", "Tokyo", "Sydney"];
const CHAMPIONS: &[&str] = &["Mayank", "Lihi", "Mike", "Dennis", "Matt"];

/// Balanced reporting tree with `fanout` reports per manager, `depth` levels below the root.
pub fn synthetic_hierarchy(depth: u32, fanout: usize) -> PersonNode {
    let mut counter = 0usize;
    build(depth, fanout, &mut counter)
}

fn build(depth: u32, fanout: usize, counter: &mut usize) -> PersonNode {
    let index = *counter;
    *counter += 1;

    let relationship = match index % 3 {
        0 => Relationship::Direct,
        1 => Relationship::Indirect,
        _ => Relationship::None,
    };
    let mut node = PersonNode::new(format!("Person {index}"))
        .with_position(if depth > 0 { "Manager" } else { "Engineer" })
        .with_location(LOCATIONS[index % LOCATIONS.len()])
        .with_relationship(relationship);
    if relationship != Relationship::None {
        node.representative_from_qt = Some(CHAMPIONS[index % CHAMPIONS.len()].to_string());
    }

    if depth > 0 {
        for _ in 0..fanout {
            node = node.with_child(build(depth - 1, fanout, counter));
        }
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_hierarchy_size() {
        let root = synthetic_hierarchy(3, 4);
        assert_eq!(root.subtree_size(), 1 + 4 + 16 + 64);
    }
}
