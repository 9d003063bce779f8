use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::text::{fold_case, strip_diacritics};

/// One (category, subcategory, merchant substring) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub category: String,
    pub subcategory: String,
    /// Raw merchant substring, matched case-insensitively.
    pub match_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseSubcategory {
    pub name: String,
    pub merchants: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseCategory {
    pub name: String,
    pub subcategories: Vec<ExpenseSubcategory>,
}

/// `category -> subcategory -> [merchant substrings]`, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseTree {
    categories: Vec<ExpenseCategory>,
}

impl ExpenseTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends merchants under `category / subcategory`, creating either
    /// level at the end if it does not exist yet.
    pub fn insert<I, S>(&mut self, category: &str, subcategory: &str, merchants: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cat_idx = match self.categories.iter().position(|c| c.name == category) {
            Some(idx) => idx,
            None => {
                self.categories.push(ExpenseCategory {
                    name: category.to_string(),
                    subcategories: Vec::new(),
                });
                self.categories.len() - 1
            }
        };
        let subs = &mut self.categories[cat_idx].subcategories;
        let sub_idx = match subs.iter().position(|s| s.name == subcategory) {
            Some(idx) => idx,
            None => {
                subs.push(ExpenseSubcategory {
                    name: subcategory.to_string(),
                    merchants: Vec::new(),
                });
                subs.len() - 1
            }
        };
        subs[sub_idx]
            .merchants
            .extend(merchants.into_iter().map(Into::into));
    }

    pub fn with<I, S>(mut self, category: &str, subcategory: &str, merchants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(category, subcategory, merchants);
        self
    }

    pub fn categories(&self) -> &[ExpenseCategory] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl<'de> Deserialize<'de> for ExpenseTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TreeVisitor;

        impl<'de> Visitor<'de> for TreeVisitor {
            type Value = ExpenseTree;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of categories to subcategories")
            }

            fn visit_map<M>(self, mut map: M) -> Result<ExpenseTree, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut categories = Vec::new();
                while let Some((name, subs)) = map.next_entry::<String, Option<Subcategories>>()? {
                    categories.push(ExpenseCategory {
                        name,
                        subcategories: subs.map(|s| s.0).unwrap_or_default(),
                    });
                }
                Ok(ExpenseTree { categories })
            }
        }

        deserializer.deserialize_map(TreeVisitor)
    }
}

/// Order-preserving subcategory map; a null merchant list reads as empty.
struct Subcategories(Vec<ExpenseSubcategory>);

impl<'de> Deserialize<'de> for Subcategories {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SubVisitor;

        impl<'de> Visitor<'de> for SubVisitor {
            type Value = Subcategories;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of subcategories to merchant lists")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Subcategories, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut subs = Vec::new();
                while let Some((name, merchants)) = map.next_entry::<String, Option<Vec<String>>>()? {
                    subs.push(ExpenseSubcategory {
                        name,
                        merchants: merchants.unwrap_or_default(),
                    });
                }
                Ok(Subcategories(subs))
            }
        }

        deserializer.deserialize_map(SubVisitor)
    }
}

/// Internal pairing of a rule with its case-folded needle.
struct CompiledRule {
    rule: Rule,
    needle: String,
}

/// Ordered rule list. Lookup is a linear scan and the first match wins, so
/// rule order is significant.
pub struct RuleTable {
    rules: Vec<CompiledRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| CompiledRule {
                needle: fold_case(&rule.match_value),
                rule,
            })
            .collect();
        Self { rules }
    }

    /// Flattens the expense tree, one rule per merchant substring, keeping
    /// category, subcategory and merchant order.
    ///
    /// A category or subcategory whose name is blank once diacritics are
    /// stripped contributes no rules: a match there could not be told apart
    /// from an unclassified transaction.
    pub fn from_expenses(tree: &ExpenseTree) -> Self {
        let mut rules = Vec::new();
        for cat in tree.categories() {
            let category = strip_diacritics(&cat.name);
            for sub in &cat.subcategories {
                let subcategory = strip_diacritics(&sub.name);
                if category.trim().is_empty() || subcategory.trim().is_empty() {
                    tracing::warn!(
                        category = %cat.name,
                        subcategory = %sub.name,
                        merchants = sub.merchants.len(),
                        "skipping expense entry with a blank name"
                    );
                    continue;
                }
                rules.extend(sub.merchants.iter().map(|m| Rule {
                    category: category.clone(),
                    subcategory: subcategory.clone(),
                    match_value: m.clone(),
                }));
            }
        }
        tracing::debug!(rules = rules.len(), "built rule table");
        Self::new(rules)
    }

    pub fn find_matching_rule(&self, merchant: &str) -> Option<&Rule> {
        let haystack = fold_case(merchant);
        self.find_folded(&haystack)
    }

    /// Lookup on a merchant that has already been case-folded.
    pub(crate) fn find_folded(&self, merchant_folded: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|cr| merchant_folded.contains(&cr.needle))
            .map(|cr| &cr.rule)
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|cr| &cr.rule)
    }

    pub fn to_rules(&self) -> Vec<Rule> {
        self.rules().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rule(category: &str, subcategory: &str, value: &str) -> Rule {
        Rule {
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            match_value: value.to_string(),
        }
    }

    fn sample_tree() -> ExpenseTree {
        ExpenseTree::new()
            .with("Shop", "Amazon", ["Amazon"])
            .with("Entertainment", "Online", ["Microsoft", "YouTube"])
    }

    #[test]
    fn flattens_in_document_order() {
        let table = RuleTable::from_expenses(&sample_tree());
        assert_eq!(
            table.to_rules(),
            vec![
                make_rule("Shop", "Amazon", "Amazon"),
                make_rule("Entertainment", "Online", "Microsoft"),
                make_rule("Entertainment", "Online", "YouTube"),
            ]
        );
    }

    #[test]
    fn strips_diacritics_from_names_not_values() {
        let tree = ExpenseTree::new().with("Café", "Pâtisserie", ["Crème"]);
        let table = RuleTable::from_expenses(&tree);
        assert_eq!(table.to_rules(), vec![make_rule("Cafe", "Patisserie", "Crème")]);
    }

    #[test]
    fn empty_tree_yields_no_rules() {
        assert!(RuleTable::from_expenses(&ExpenseTree::new()).is_empty());
    }

    #[test]
    fn empty_subcategories_yield_no_rules() {
        let tree = ExpenseTree::new()
            .with("Shop", "Amazon", Vec::<String>::new())
            .with("Food", "Groceries", ["Lidl"]);
        let table = RuleTable::from_expenses(&tree);
        assert_eq!(table.to_rules(), vec![make_rule("Food", "Groceries", "Lidl")]);
    }

    #[test]
    fn blank_names_yield_no_rules() {
        let tree = ExpenseTree::new()
            .with("Shop", "", ["Amazon"])
            .with("", "Online", ["YouTube"])
            .with("Shop", "\u{301}", ["Lidl"])
            .with("Shop", "Books", ["Amazon"]);
        let table = RuleTable::from_expenses(&tree);
        assert_eq!(table.to_rules(), vec![make_rule("Shop", "Books", "Amazon")]);
        assert_eq!(table.find_matching_rule("AMAZON EU").unwrap().subcategory, "Books");
        assert!(table.find_matching_rule("YouTube").is_none());
    }

    #[test]
    fn blank_subcategory_in_yaml_is_dropped() {
        let yaml = "Shop:\n  '': ['Amazon']\n  Books: ['Waterstones']\n";
        let tree: ExpenseTree = serde_yaml::from_str(yaml).unwrap();
        let table = RuleTable::from_expenses(&tree);
        assert!(table.find_matching_rule("Amazon").is_none());
        assert_eq!(table.to_rules(), vec![make_rule("Shop", "Books", "Waterstones")]);
    }

    #[test]
    fn insert_merges_into_existing_levels() {
        let mut tree = sample_tree();
        tree.insert("Shop", "Amazon", ["AMZN"]);
        assert_eq!(tree.categories().len(), 2);
        assert_eq!(tree.categories()[0].subcategories[0].merchants, vec!["Amazon", "AMZN"]);
    }

    #[test]
    fn contains_match_case_insensitive() {
        let table = RuleTable::from_expenses(&sample_tree());
        let rule = table.find_matching_rule("AMAZON MARKETPLACE").unwrap();
        assert_eq!(rule.subcategory, "Amazon");
        assert_eq!(
            table.find_matching_rule("paypal *youtube premium").unwrap().subcategory,
            "Online"
        );
    }

    #[test]
    fn contains_no_match() {
        let table = RuleTable::from_expenses(&sample_tree());
        assert!(table.find_matching_rule("STARBUCKS").is_none());
    }

    #[test]
    fn first_rule_in_order_wins() {
        let table = RuleTable::new(vec![
            make_rule("Shop", "General", "amazon"),
            make_rule("Entertainment", "Video", "amazon prime"),
        ]);
        let rule = table.find_matching_rule("Amazon Prime Video").unwrap();
        assert_eq!(rule.category, "Shop");
    }

    #[test]
    fn deserializes_yaml_in_document_order() {
        let yaml = r#"
Zebra:
  Stripes: ['zz']
Alpha:
  Beta:
    - 'b1'
    - 'b2'
  Empty:
Nothing:
"#;
        let tree: ExpenseTree = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<&str> = tree.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zebra", "Alpha", "Nothing"]);
        assert_eq!(tree.categories()[1].subcategories[0].merchants, vec!["b1", "b2"]);
        assert!(tree.categories()[1].subcategories[1].merchants.is_empty());
        assert!(tree.categories()[2].subcategories.is_empty());

        let table = RuleTable::from_expenses(&tree);
        let values: Vec<&str> = table.rules().map(|r| r.match_value.as_str()).collect();
        assert_eq!(values, vec!["zz", "b1", "b2"]);
    }
}
