//! Affiliate enrichment: attach per-category links to a script and append
//! them (plus a disclosure) to the description. Never fails.

use std::collections::HashMap;

use crate::config::AffiliateConfig;
use crate::model::{AffiliateLink, Category, ScriptArtifact};

pub trait AffiliateEnricher: Send + Sync {
    fn enrich(&self, script: ScriptArtifact, category: Category) -> ScriptArtifact;
}

pub struct CategoryAffiliates {
    disclosure: String,
    links: HashMap<Category, Vec<AffiliateLink>>,
}

impl CategoryAffiliates {
    pub fn from_config(cfg: &AffiliateConfig) -> Self {
        let mut links: HashMap<Category, Vec<AffiliateLink>> = HashMap::new();
        for (label, v) in &cfg.links {
            let entry = links.entry(Category::from_label(label)).or_default();
            entry.extend(
                v.iter()
                    .filter(|l| !l.url.trim().is_empty())
                    .cloned(),
            );
        }
        Self {
            disclosure: cfg.disclosure.trim().to_string(),
            links,
        }
    }
}

impl AffiliateEnricher for CategoryAffiliates {
    fn enrich(&self, mut script: ScriptArtifact, category: Category) -> ScriptArtifact {
        let Some(links) = self.links.get(&category).filter(|l| !l.is_empty()) else {
            return script;
        };

        let mut block = String::new();
        for l in links {
            if script.affiliate_links.contains(l) {
                continue;
            }
            block.push_str(&format!("\n{}: {}", l.label, l.url));
            script.affiliate_links.push(l.clone());
        }
        if block.is_empty() {
            return script;
        }
        if !self.disclosure.is_empty() {
            block.push_str(&format!("\n\n{}", self.disclosure));
        }
        script.description = format!("{}\n{}", script.description.trim_end(), block);
        script
    }
}
