//! Pure translation from checked parameters to a [`QuerySpec`].

use crate::check::{Checked, CheckedParams};
use crate::policy::{DEFAULT_LIMIT, DEFAULT_PAGE, FieldRule, MatchMode};
use crate::spec::{Condition, Filter, Page, QuerySpec, Scalar, Sort};

fn condition(rule: &'static FieldRule, value: &Checked) -> Condition {
    let path = rule.path;
    match (rule.mode, value) {
        (_, Checked::Bounds { min, max }) => Condition::Between {
            path,
            min: *min,
            max: *max,
        },
        (_, Checked::Id(id)) => Condition::Equals {
            path,
            value: Scalar::Id(*id),
        },
        (_, Checked::Flag(flag)) => Condition::Equals {
            path,
            value: Scalar::Flag(*flag),
        },
        (MatchMode::Contains, Checked::Text(text)) => Condition::Contains {
            path,
            needle: text.clone(),
        },
        (MatchMode::FullText, Checked::Text(text)) => Condition::Search(text.clone()),
        (MatchMode::ExactUppercase, Checked::Text(text)) => Condition::Equals {
            path,
            value: Scalar::Text(text.to_uppercase()),
        },
        (_, Checked::Text(text)) => Condition::Equals {
            path,
            value: Scalar::Text(text.clone()),
        },
    }
}

/// Build the query descriptor, filling in the policy's defaults
pub fn compile(checked: &CheckedParams) -> QuerySpec {
    let policy = checked.policy();

    let filter = Filter::new(
        checked
            .values()
            .iter()
            .map(|(rule, value)| condition(rule, value))
            .collect(),
    );

    let sort = Sort {
        field: checked.sort_by().unwrap_or(policy.default_sort).to_string(),
        order: checked.order().unwrap_or(policy.default_order),
    };

    let page = Page {
        number: checked.page().unwrap_or(DEFAULT_PAGE),
        size: checked.limit().unwrap_or(DEFAULT_LIMIT),
    };

    QuerySpec {
        filter,
        sort,
        page,
        populate: policy.populate,
    }
}
