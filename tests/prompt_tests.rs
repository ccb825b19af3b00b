// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::Write;

use celestial_lens::error::LensError;
use celestial_lens::prompt::catalog::{Catalog, TemplateSelection};
use celestial_lens::prompt::composer::PromptComposer;
use celestial_lens::prompt::variables::{Variable, VariableBag};

#[test]
fn test_unfilled_variable_uses_marker() {
    let catalog = Catalog::builtin();
    let (selection, _) = catalog.find_template("talent_3").unwrap();

    let prompt =
        PromptComposer::new(&catalog).compose(Some(selection), None, &VariableBag::new(), None);

    assert_eq!(
        prompt,
        "我目前正在做 [未填寫]，根據我的八字能量，我該注意什麼才能事半功倍？"
    );
}

#[test]
fn test_filled_variable_and_style() {
    let catalog = Catalog::builtin();
    let (selection, _) = catalog.find_template("talent_3").unwrap();
    let style = catalog.find_style("spiritual");
    let bag = VariableBag::new().with(Variable::CurrentJob, "瑜伽老師");

    let prompt = PromptComposer::new(&catalog).compose(Some(selection), style, &bag, None);

    assert_eq!(
        prompt,
        "我目前正在做 瑜伽老師，根據我的八字能量，我該注意什麼才能事半功倍？\n\n請用身心靈的方式解讀。"
    );
}

#[test]
fn test_override_beats_selection() {
    let catalog = Catalog::builtin();
    let bag = VariableBag::new()
        .with(Variable::StrengthA, "溝通")
        .with(Variable::StrengthB, "分析");

    let prompt = PromptComposer::new(&catalog).compose(
        Some(TemplateSelection::new(1, 0)),
        None,
        &bag,
        Some("結合 {strength_a} 與 {strength_b} 的工作"),
    );

    assert_eq!(prompt, "結合 溝通 與 分析 的工作");
}

#[test]
fn test_nothing_selected_falls_back_to_first_template() {
    let catalog = Catalog::builtin();
    let prompt = PromptComposer::new(&catalog).compose(None, None, &VariableBag::new(), None);
    assert_eq!(prompt, catalog.default_template().template_text);
    assert!(prompt.starts_with("請你當我的八字顧問"));
}

#[test]
fn test_custom_marker() {
    let catalog = Catalog::builtin();
    let prompt = PromptComposer::new(&catalog)
        .with_not_provided_marker("(not provided)")
        .compose(None, None, &VariableBag::new(), Some("job: {current_job}"));
    assert_eq!(prompt, "job: (not provided)");
}

#[test]
fn test_every_builtin_template_composes_without_placeholders() {
    let catalog = Catalog::builtin();
    let composer = PromptComposer::new(&catalog);
    for (c, category) in catalog.categories().iter().enumerate() {
        for t in 0..category.templates.len() {
            let prompt = composer.compose(
                Some(TemplateSelection::new(c, t)),
                None,
                &VariableBag::new(),
                None,
            );
            for variable in Variable::ALL {
                assert!(!prompt.contains(&variable.placeholder()), "{}", prompt);
            }
        }
    }
}

#[test]
fn test_toml_catalog_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[categories]]
title = "Custom"

[[categories.templates]]
id = "custom_1"
label = "Custom one"
template = "Strengths: {{strength_a}} / {{strength_b}}"
declares_variables = true

[[styles]]
id = "short"
label = "Short"
suffix = " Keep it short."
"#
    )
    .unwrap();

    let catalog = Catalog::load_from(file.path()).unwrap();
    let (selection, template) = catalog.find_template("custom_1").unwrap();
    assert!(template.declares_variables);
    assert_eq!(
        template.variables(),
        vec![Variable::StrengthA, Variable::StrengthB]
    );

    let prompt = PromptComposer::new(&catalog).compose(
        Some(selection),
        catalog.find_style("short"),
        &VariableBag::new().with(Variable::StrengthA, "focus"),
        None,
    );
    assert_eq!(prompt, "Strengths: focus / [未填寫] Keep it short.");
}

#[test]
fn test_empty_toml_catalog_rejected() {
    let err = Catalog::from_toml_str("").unwrap_err();
    assert!(matches!(err, LensError::Catalog(_)));
}
