//! GraphQL query documents sent to the platform.

/// Identity of the signed-in user
pub const USER_INFO_QUERY: &str = r#"
{
    user {
        login
        lastName
        firstName
    }
}
"#;

/// Audit statistics
pub const AUDIT_RATIO_QUERY: &str = r#"
{
    user {
        auditRatio
        totalDown
        totalUp
    }
}
"#;

/// XP counted towards the module total: projects, piscines and checkpoints
pub const TOTAL_XP_QUERY: &str = r#"
{
    transaction(
        where: {
            type: {_eq: "xp"},
            _or: [
                {object: {type: {_eq: "project"}}},
                {object: {type: {_eq: "piscine"}}},
                {path: {_ilike: "%module/checkpoint%"}}
            ]
        }
    ) {
        amount
        path
        object {
            name
            type
        }
    }
}
"#;

/// Same XP transactions, oldest first, for the progress chart
pub const XP_PROGRESS_QUERY: &str = r#"
{
    transaction(
        where: {
            type: {_eq: "xp"},
            _or: [
                {object: {type: {_eq: "project"}}},
                {object: {type: {_eq: "piscine"}}},
                {path: {_ilike: "%module/checkpoint%"}}
            ]
        },
        order_by: {createdAt: asc}
    ) {
        amount
        createdAt
        path
        object {
            name
            type
        }
    }
}
"#;

/// Skill level transactions
pub const SKILLS_QUERY: &str = r#"
{
    transaction(
        where: {type: {_like: "skill_%"}},
        order_by: {amount: desc}
    ) {
        type
        amount
    }
}
"#;
