// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Template catalog
//!
//! An ordered list of categories, each holding ordered prompt templates, plus
//! an independent list of style suffixes. The catalog is immutable once built.
//! Ordering matters: the first template of the first category is the
//! composer's fallback.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};
use crate::prompt::variables::{referenced_variables, Variable};

/// A labeled prompt template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub label: String,
    #[serde(rename = "template")]
    pub template_text: String,
    /// Whether the template expects the user to fill in variables
    #[serde(default)]
    pub declares_variables: bool,
}

impl PromptTemplate {
    pub fn new(id: &str, label: &str, template_text: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            template_text: template_text.to_string(),
            declares_variables: false,
        }
    }

    /// Mark the template as consuming variables
    pub fn with_variables(mut self) -> Self {
        self.declares_variables = true;
        self
    }

    /// Variables the template text actually references
    pub fn variables(&self) -> Vec<Variable> {
        referenced_variables(&self.template_text)
    }
}

/// An ordered group of templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCategory {
    pub title: String,
    #[serde(default)]
    pub templates: Vec<PromptTemplate>,
}

/// A tone modifier appended verbatim to the composed base text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOption {
    pub id: String,
    pub label: String,
    #[serde(rename = "suffix")]
    pub suffix_text: String,
}

impl StyleOption {
    pub fn new(id: &str, label: &str, suffix_text: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            suffix_text: suffix_text.to_string(),
        }
    }
}

/// Position of a template inside the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemplateSelection {
    pub category: usize,
    pub template: usize,
}

impl TemplateSelection {
    pub fn new(category: usize, template: usize) -> Self {
        Self { category, template }
    }
}

/// The full template and style catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    categories: Vec<PromptCategory>,
    styles: Vec<StyleOption>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<PromptCategory>,
    #[serde(default)]
    styles: Vec<StyleOption>,
}

impl Catalog {
    /// Build a catalog, rejecting one without a default template
    pub fn new(categories: Vec<PromptCategory>, styles: Vec<StyleOption>) -> Result<Self> {
        match categories.first() {
            None => {
                return Err(LensError::Catalog(
                    "catalog must contain at least one category".to_string(),
                ))
            }
            Some(first) if first.templates.is_empty() => {
                return Err(LensError::Catalog(format!(
                    "first category '{}' has no templates",
                    first.title
                )))
            }
            Some(_) => {}
        }

        let mut seen = std::collections::HashSet::new();
        for template in categories.iter().flat_map(|c| c.templates.iter()) {
            if !seen.insert(template.id.as_str()) {
                return Err(LensError::Catalog(format!(
                    "duplicate template id '{}'",
                    template.id
                )));
            }
        }

        Ok(Self { categories, styles })
    }

    /// Parse a TOML catalog document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.categories, file.styles)
    }

    /// Load a TOML catalog from disk
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn categories(&self) -> &[PromptCategory] {
        &self.categories
    }

    pub fn styles(&self) -> &[StyleOption] {
        &self.styles
    }

    pub fn template(&self, selection: TemplateSelection) -> Option<&PromptTemplate> {
        self.categories
            .get(selection.category)?
            .templates
            .get(selection.template)
    }

    /// First template of the first category
    pub fn default_template(&self) -> &PromptTemplate {
        // Catalog::new guarantees the first category is non-empty.
        &self.categories[0].templates[0]
    }

    /// Locate a template by id
    pub fn find_template(&self, id: &str) -> Option<(TemplateSelection, &PromptTemplate)> {
        self.categories
            .iter()
            .enumerate()
            .find_map(|(ci, category)| {
                category
                    .templates
                    .iter()
                    .position(|t| t.id == id)
                    .map(|ti| (TemplateSelection::new(ci, ti), &category.templates[ti]))
            })
    }

    pub fn find_style(&self, id: &str) -> Option<&StyleOption> {
        self.styles.iter().find(|s| s.id == id)
    }

    /// The catalog shipped with the application
    pub fn builtin() -> Self {
        Self {
            categories: builtin_categories(),
            styles: builtin_styles(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_categories() -> Vec<PromptCategory> {
    vec![
        PromptCategory {
            title: "一. 基本解讀".to_string(),
            templates: vec![PromptTemplate::new(
                "basic_consultant",
                "八字顧問綜合分析",
                "請你當我的八字顧問，詳細分析這張截圖的命主性格，日主五行、身強或身弱。\n\n並請依序解讀：\na. 根據格局，提議多元且符合現代趨勢的工作事業方式。\nb. 分析我的財務能量與五行喜忌用神。\nc. 分析命盤所有不同階段的十年大運，與十神的特性(請附整理表格)。\n備註： 我是 [男] 性。",
            )],
        },
        PromptCategory {
            title: "二. 探索天賦地圖".to_string(),
            templates: vec![
                PromptTemplate::new("talent_1", "我的天賦是什麼？", "根據我的命盤，你認為我有什麼天賦呢？"),
                PromptTemplate::new(
                    "talent_2",
                    "地球體驗天賦",
                    "根據我的八字，你認為我有什麼天賦，能讓我在地球上好好體驗呢？",
                ),
                PromptTemplate::new(
                    "talent_3",
                    "事業現狀避坑",
                    "我目前正在做 {current_job}，根據我的八字能量，我該注意什麼才能事半功倍？",
                )
                .with_variables(),
                PromptTemplate::new(
                    "talent_4",
                    "AI 與我的天賦發揮",
                    "AI對我發揮天賦的意義是什麼？我可以如何運用Gemini以及其他AI工具來發揮能力？請為我分析，謝謝。",
                ),
                PromptTemplate::new(
                    "talent_5",
                    "生命設計顧問 (機器比喻)",
                    "你現在是我的生命設計顧問：如果我是一台精密機器，我的原廠設定『預設強項』與『容易耗能的地方』分別是什麼？",
                ),
            ],
        },
        PromptCategory {
            title: "三. 進階運勢能量".to_string(),
            templates: vec![
                PromptTemplate::new(
                    "adv_1",
                    "未來趨勢工作方式",
                    "關於八字的能量，我適合什麼什麼類型的工作方式？（符合未來趨勢、多元彈性的）",
                ),
                PromptTemplate::new(
                    "adv_2",
                    "三元九運：離火運策略",
                    "在三元九運的「離火運」下，如何發揮我的事業天賦與商業模式？",
                ),
                PromptTemplate::new("adv_3", "當前大運天賦發揮", "在我目前的大運狀態下，如何發揮我的天賦？"),
                PromptTemplate::new(
                    "adv_4",
                    "職業戰略家模式",
                    "請你進入『職業戰略家』模式。根據剛才解析的八字十神格局，我注意到我有 [強項 A：{strength_a}] 與 [強項 B：{strength_b}] 這兩種能量。\n\n請幫我依序進行以下探索：\na. 化學反應分析：這兩種能量結合時，會產生什麼樣的『獨特工作風格』？\nb. 跨領域提案：請提出 3 個非傳統、具備未來感的『職業組合』，這些組合必須能同時發揮我的技術才華與內在價值感。\nc. 避坑指南：在整合這些能力時，我最容易遇到的『自我內耗』點是什麼？",
                )
                .with_variables(),
            ],
        },
        PromptCategory {
            title: "四. 語氣風格轉換".to_string(),
            templates: vec![
                PromptTemplate::new("style_1", "白話解讀", "請幫我將以上分析，用白話的方式解讀。"),
                PromptTemplate::new("style_2", "身心靈解讀", "請幫我將以上分析，用身心靈的方式解讀。"),
                PromptTemplate::new("style_3", "能量角度解讀", "請幫我將以上分析，用能量的方式解讀。"),
            ],
        },
    ]
}

fn builtin_styles() -> Vec<StyleOption> {
    vec![
        StyleOption::new("plain", "白話", "\n\n請用白話的方式解讀。"),
        StyleOption::new("spiritual", "身心靈", "\n\n請用身心靈的方式解讀。"),
        StyleOption::new("energy", "能量角度", "\n\n請用能量的方式解讀。"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_category_order() {
        let catalog = Catalog::builtin();
        let titles: Vec<&str> = catalog
            .categories()
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec!["一. 基本解讀", "二. 探索天賦地圖", "三. 進階運勢能量", "四. 語氣風格轉換"]
        );
    }

    #[test]
    fn test_builtin_default_template() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.default_template().id, "basic_consultant");
    }

    #[test]
    fn test_builtin_is_valid() {
        let catalog = Catalog::builtin();
        let rebuilt = Catalog::new(
            catalog.categories().to_vec(),
            catalog.styles().to_vec(),
        )
        .unwrap();
        assert_eq!(rebuilt, catalog);
    }

    #[test]
    fn test_declared_variables_match_text() {
        let catalog = Catalog::builtin();
        for template in catalog.categories().iter().flat_map(|c| &c.templates) {
            assert_eq!(
                template.declares_variables,
                !template.variables().is_empty(),
                "template {}",
                template.id
            );
        }
    }

    #[test]
    fn test_find_template() {
        let catalog = Catalog::builtin();
        let (selection, template) = catalog.find_template("adv_4").unwrap();
        assert_eq!(selection, TemplateSelection::new(2, 3));
        assert_eq!(
            template.variables(),
            vec![Variable::StrengthA, Variable::StrengthB]
        );
        assert!(catalog.find_template("missing").is_none());
    }

    #[test]
    fn test_template_lookup_out_of_range() {
        let catalog = Catalog::builtin();
        assert!(catalog.template(TemplateSelection::new(9, 0)).is_none());
        assert!(catalog.template(TemplateSelection::new(0, 9)).is_none());
        assert_eq!(
            catalog.template(TemplateSelection::new(1, 2)).unwrap().id,
            "talent_3"
        );
    }

    #[test]
    fn test_find_style() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.find_style("plain").unwrap().label, "白話");
        assert!(catalog.find_style("loud").is_none());
    }

    #[test]
    fn test_new_rejects_empty_catalog() {
        assert!(matches!(
            Catalog::new(vec![], vec![]),
            Err(LensError::Catalog(_))
        ));
    }

    #[test]
    fn test_new_rejects_empty_first_category() {
        let categories = vec![PromptCategory {
            title: "empty".to_string(),
            templates: vec![],
        }];
        assert!(Catalog::new(categories, vec![]).is_err());
    }

    #[test]
    fn test_new_rejects_duplicate_ids() {
        let categories = vec![PromptCategory {
            title: "dup".to_string(),
            templates: vec![
                PromptTemplate::new("a", "A", "one"),
                PromptTemplate::new("a", "A again", "two"),
            ],
        }];
        assert!(Catalog::new(categories, vec![]).is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let toml = r#"
[[categories]]
title = "Basics"

[[categories.templates]]
id = "intro"
label = "Intro"
template = "Describe {current_job}"
declares_variables = true

[[categories.templates]]
id = "plain"
label = "Plain"
template = "Tell me more"

[[styles]]
id = "short"
label = "Short"
suffix = " Keep it short."
"#;
        let catalog = Catalog::from_toml_str(toml).unwrap();
        assert_eq!(catalog.categories().len(), 1);
        assert_eq!(catalog.categories()[0].templates.len(), 2);
        assert!(catalog.default_template().declares_variables);
        assert!(!catalog.categories()[0].templates[1].declares_variables);
        assert_eq!(catalog.find_style("short").unwrap().suffix_text, " Keep it short.");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        assert!(matches!(
            Catalog::from_toml_str("categories = 3"),
            Err(LensError::Toml(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "[[categories]]\ntitle = \"T\"\n[[categories.templates]]\nid = \"x\"\nlabel = \"X\"\ntemplate = \"hello\"\n",
        )
        .unwrap();
        let catalog = Catalog::load_from(&path).unwrap();
        assert_eq!(catalog.default_template().template_text, "hello");
    }
}
