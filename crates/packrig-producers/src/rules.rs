//! Module transform rules.
//!
//! Rules are built per category, and each category's `Vec<Rule>` is reduced
//! through its own extension points. The concatenated [`RuleSet`] is then
//! reduced through `rules-for-<env>` and `rules`.

use std::path::PathBuf;
use std::sync::Arc;

use packrig_config::{ConfigurationParams, Target};
use packrig_reducer::ReducerPipeline;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config_file::ConfigFile;
use crate::error::Result;
use crate::points::{self, RuleCategory};
use crate::schema::{Condition, LoaderUse, Rule};

pub const SCRIPT_TEST: &str = r"\.jsx?$";
pub const SCSS_TEST: &str = r"\.scss$";
pub const CSS_TEST: &str = r"\.css$";
pub const HTML_TEST: &str = r"\.html$";
pub const FONT_TEST: &str = r"\.(woff2?|ttf|eot|otf)$";
pub const IMAGE_TEST: &str = r"\.(png|jpe?g|gif|webp|svg)$";
pub const ICON_TEST: &str = r"\.icon\.svg$";

const SVG_TEST: &str = r"\.svg$";
const FONTS_DIR: &str = r"[\\/]fonts[\\/]";

/// Inline images at or below this size (bytes) as data URLs
pub const IMAGE_INLINE_LIMIT: u64 = 10_000;

const LOCAL_IDENT_NAME: &str = "[name]__[local]___[hash:base64:5]";

/// Loader that hands CSS to the extract-css plugin
pub const EXTRACT_CSS_LOADER: &str = "extract-css-loader";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

pub struct RulesConfig {
    pipeline: Arc<ReducerPipeline>,
}

impl RulesConfig {
    pub const KEY: &'static str = "config.rules";

    pub fn new(pipeline: Arc<ReducerPipeline>) -> Self {
        Self { pipeline }
    }

    /// Rules for one category after its extension points have run.
    pub fn category_rules(
        &self,
        category: RuleCategory,
        params: &ConfigurationParams,
    ) -> Result<Vec<Rule>> {
        let environment = params.target.environment;
        let rules = default_rules(category, params);
        let rules = self.pipeline.reduce(
            &[category.point_for(environment), category.point()],
            rules,
            params,
        )?;
        Ok(rules)
    }
}

impl ConfigFile for RulesConfig {
    type Output = RuleSet;

    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn create_config(&self, params: &ConfigurationParams) -> Result<RuleSet> {
        let mut rules = Vec::new();
        for category in RuleCategory::ALL {
            rules.extend(self.category_rules(category, params)?);
        }

        let environment = params.target.environment;
        let set = self.pipeline.reduce(
            &[points::rules_for(environment), points::RULES],
            RuleSet { rules },
            params,
        )?;

        debug!(target_name = %params.target.name, rules = set.rules.len(), "built module rules");
        Ok(set)
    }
}

fn default_rules(category: RuleCategory, params: &ConfigurationParams) -> Vec<Rule> {
    let target = &params.target;
    match category {
        RuleCategory::Script => vec![script_rule(target)],
        RuleCategory::Scss => vec![style_rule(SCSS_TEST, target, true)],
        RuleCategory::Css => vec![style_rule(CSS_TEST, target, false)],
        RuleCategory::Html => vec![Rule::new(HTML_TEST).loader(LoaderUse::new("html-loader"))],
        RuleCategory::Font => font_rules(params),
        RuleCategory::Image => vec![image_rule(params)],
        RuleCategory::Icon => vec![Rule::new(ICON_TEST).loader(LoaderUse::new("svg-inline-loader"))],
    }
}

fn script_rule(target: &Target) -> Rule {
    let mut rule = Rule::new(SCRIPT_TEST).include(Condition::Path(target.src_folder.clone()));
    for module in &target.include_modules {
        rule = rule.include(Condition::Path(PathBuf::from("node_modules").join(module)));
    }
    rule.loader(LoaderUse::new("babel-loader").with_options(json!({ "cacheDirectory": true })))
}

fn style_rule(test: &str, target: &Target, scss: bool) -> Rule {
    let mut options = json!({
        "modules": target.css.modules,
        "importLoaders": if scss { 1 } else { 0 },
    });
    if target.css.modules {
        options["localIdentName"] = json!(LOCAL_IDENT_NAME);
    }

    let mut rule = Rule::new(test);
    if target.is_node() {
        rule = rule.loader(LoaderUse::new("css-loader/locals").with_options(options));
    } else {
        let first = if target.css.inject {
            "style-loader"
        } else {
            EXTRACT_CSS_LOADER
        };
        rule = rule
            .loader(LoaderUse::new(first))
            .loader(LoaderUse::new("css-loader").with_options(options));
    }

    if scss {
        rule = rule.loader(LoaderUse::new("sass-loader"));
    }
    rule
}

fn font_rules(params: &ConfigurationParams) -> Vec<Rule> {
    let loader = || LoaderUse::new("file-loader").with_options(json!({ "name": params.output.font }));
    vec![
        Rule::new(FONT_TEST).loader(loader()),
        Rule::new(SVG_TEST)
            .include(Condition::Pattern(FONTS_DIR.to_string()))
            .loader(loader()),
    ]
}

fn image_rule(params: &ConfigurationParams) -> Rule {
    Rule::new(IMAGE_TEST)
        .exclude(Condition::Pattern(ICON_TEST.to_string()))
        .exclude(Condition::Pattern(FONTS_DIR.to_string()))
        .loader(LoaderUse::new("url-loader").with_options(json!({
            "limit": IMAGE_INLINE_LIMIT,
            "name": params.output.image,
        })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use packrig_config::Environment;

    fn params(environment: Environment) -> ConfigurationParams {
        ConfigurationParams::new(
            Target::new("app", environment).with_entry("main", ["./src/index.js"]),
        )
    }

    fn rules_for(params: &ConfigurationParams) -> Vec<Rule> {
        RulesConfig::new(Arc::new(ReducerPipeline::empty()))
            .get_config(params)
            .unwrap()
            .rules
    }

    fn rule_matching<'a>(rules: &'a [Rule], path: &str) -> Vec<&'a Rule> {
        rules.iter().filter(|r| r.matches(path).unwrap()).collect()
    }

    #[test]
    fn categories_appear_in_fixed_order() {
        let rules = rules_for(&params(Environment::Browser));
        let tests: Vec<&str> = rules.iter().map(|r| r.test.as_str()).collect();
        assert_eq!(
            tests,
            vec![SCRIPT_TEST, SCSS_TEST, CSS_TEST, HTML_TEST, FONT_TEST, SVG_TEST, IMAGE_TEST, ICON_TEST]
        );
    }

    #[test]
    fn scripts_are_limited_to_sources_and_included_modules() {
        let mut params = params(Environment::Browser);
        params.target.include_modules = vec!["shared-ui".to_string()];
        let rules = rules_for(&params);

        assert_eq!(rule_matching(&rules, "src/app.jsx").len(), 1);
        assert_eq!(rule_matching(&rules, "node_modules/shared-ui/index.js").len(), 1);
        assert!(rule_matching(&rules, "node_modules/react/index.js").is_empty());
    }

    #[test]
    fn node_stylesheets_use_locals_only() {
        let rules = rules_for(&params(Environment::Node));
        let css = rule_matching(&rules, "src/app.css");
        assert_eq!(css[0].loader_names(), vec!["css-loader/locals"]);

        let scss = rule_matching(&rules, "src/app.scss");
        assert_eq!(scss[0].loader_names(), vec!["css-loader/locals", "sass-loader"]);
    }

    #[test]
    fn browser_stylesheets_inject_or_extract() {
        let mut params = params(Environment::Browser);
        let rules = rules_for(&params);
        assert_eq!(
            rule_matching(&rules, "src/app.css")[0].loader_names(),
            vec![EXTRACT_CSS_LOADER, "css-loader"]
        );

        params.target.css.inject = true;
        params.target.css.modules = true;
        let rules = rules_for(&params);
        let scss = rule_matching(&rules, "src/app.scss")[0];
        assert_eq!(scss.loader_names(), vec!["style-loader", "css-loader", "sass-loader"]);
        assert_eq!(scss.loaders[1].options["localIdentName"], LOCAL_IDENT_NAME);
        assert_eq!(scss.loaders[1].options["importLoaders"], 1);
    }

    #[test]
    fn svg_is_routed_by_location_and_name() {
        let rules = rules_for(&params(Environment::Browser));

        let icon = rule_matching(&rules, "src/menu.icon.svg");
        assert_eq!(icon.len(), 1);
        assert_eq!(icon[0].loader_names(), vec!["svg-inline-loader"]);

        let font = rule_matching(&rules, "src/fonts/glyphs.svg");
        assert_eq!(font.len(), 1);
        assert_eq!(font[0].loader_names(), vec!["file-loader"]);

        let image = rule_matching(&rules, "src/images/logo.svg");
        assert_eq!(image.len(), 1);
        assert_eq!(image[0].loader_names(), vec!["url-loader"]);
        assert_eq!(image[0].loaders[0].options["limit"], IMAGE_INLINE_LIMIT);
    }

    #[test]
    fn category_handlers_run_before_combined_handlers() {
        let pipeline = ReducerPipeline::builder()
            .on("script-rules-for-browser", |mut rules: Vec<Rule>, _: &ConfigurationParams| {
                rules.push(Rule::new(r"\.ts$").loader(LoaderUse::new("ts-loader")));
                Ok(rules)
            })
            .on(points::RULES, |mut set: RuleSet, _: &ConfigurationParams| {
                set.rules.retain(|r| r.test != HTML_TEST);
                Ok(set)
            })
            .build();

        let rules = RulesConfig::new(Arc::new(pipeline))
            .get_config(&params(Environment::Browser))
            .unwrap()
            .rules;

        assert_eq!(rules[1].test, r"\.ts$");
        assert!(rules.iter().all(|r| r.test != HTML_TEST));
    }

    #[test]
    fn environment_rule_set_handlers_see_every_category() {
        let pipeline = ReducerPipeline::builder()
            .on(points::RULES_FOR_NODE, |mut set: RuleSet, _: &ConfigurationParams| {
                assert_eq!(set.rules.len(), 8);
                set.rules.push(Rule::new(r"\.node$").loader(LoaderUse::new("node-loader")));
                Ok(set)
            })
            .on(points::RULES, |set: RuleSet, _: &ConfigurationParams| {
                assert_eq!(set.rules.last().unwrap().test, r"\.node$");
                Ok(set)
            })
            .build();

        let set = RulesConfig::new(Arc::new(pipeline))
            .get_config(&params(Environment::Node))
            .unwrap();
        assert_eq!(set.rules.len(), 9);
    }
}
