//! Role-based vendor filtering.

use serde::Serialize;

use crate::model::{RelationshipType, Role, Vendor};

/// Vendors that serve a role, split by relationship.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VendorPartition {
    pub role: Role,
    pub vendors: Vec<Vendor>,
    pub customers: Vec<Vendor>,
}

/// Vendors whose roles include `role`, optionally restricted to one relationship type.
pub fn filter_for_role(
    vendors: &[Vendor],
    role: Role,
    relationship: Option<RelationshipType>,
) -> Vec<Vendor> {
    vendors
        .iter()
        .filter(|v| v.serves(role))
        .filter(|v| relationship.map_or(true, |r| v.relationship_type == r))
        .cloned()
        .collect()
}

pub fn partition_for_role(vendors: &[Vendor], role: Role) -> VendorPartition {
    let (vendors, customers) = vendors
        .iter()
        .filter(|v| v.serves(role))
        .cloned()
        .partition(|v| v.relationship_type == RelationshipType::Vendor);

    VendorPartition { role, vendors, customers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;

    #[test]
    fn test_filter_only_matching_roles() {
        let all = demo::vendors();
        let result = filter_for_role(&all, Role::Distributor, None);

        assert!(!result.is_empty());
        assert!(result.iter().all(|v| v.roles.contains(&Role::Distributor)));
        let expected = all.iter().filter(|v| v.roles.contains(&Role::Distributor)).count();
        assert_eq!(result.len(), expected);
    }

    #[test]
    fn test_filter_by_relationship() {
        let all = demo::vendors();
        let customers = filter_for_role(&all, Role::Manufacturer, Some(RelationshipType::Customer));

        let names: Vec<_> = customers.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Metro Auto Dealers"]);
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let all = demo::vendors();
        let split = partition_for_role(&all, Role::Manufacturer);

        assert!(split.vendors.iter().all(|v| v.relationship_type == RelationshipType::Vendor));
        assert!(split.customers.iter().all(|v| v.relationship_type == RelationshipType::Customer));
        assert_eq!(
            split.vendors.len() + split.customers.len(),
            filter_for_role(&all, Role::Manufacturer, None).len()
        );
    }

    #[test]
    fn test_admin_sees_nothing_unless_listed() {
        let all = demo::vendors();
        assert!(filter_for_role(&all, Role::Admin, None).is_empty());
    }
}
