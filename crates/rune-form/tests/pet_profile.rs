use anyhow::Result;
use rune_form::{FieldKind, FieldValue, Form, FormError, Row, dependency};

const PET_PROFILE: &str = include_str!("../forms/pet_profile.json");

fn section_ids(form: &Form, index: usize) -> Vec<String> {
    form.fields_in_section(index)
        .into_iter()
        .map(|row| match row {
            Row::Field(field) => field.id().to_string(),
            Row::Separator => "-".to_string(),
        })
        .collect()
}

fn assert_settled(form: &Form) {
    for field in form.fields().filter(|f| f.has_dependencies()) {
        assert_eq!(
            field.is_enabled(),
            dependency::evaluate(field.dependencies(), form.values()),
            "stale enabled state on `{}`",
            field.id()
        );
    }
}

#[test]
fn decodes_bundled_form() -> Result<()> {
    let form = Form::from_json_str(PET_PROFILE)?;
    assert_eq!(form.name(), Some("petProfile"));
    assert_eq!(form.title(), Some("Pet profile"));
    assert_eq!(form.field_count(), 12);
    assert_eq!(form.section_count(), 4);

    let species = form.field("species").expect("species field");
    assert_eq!(species.kind(), FieldKind::Picker);
    assert_eq!(species.options().title("other"), Some("Something else"));
    assert_eq!(form.field("age").map(|f| f.value()), Some(&FieldValue::Number(1.0)));

    let names: Vec<&str> = form.values().names().collect();
    assert_eq!(names, vec!["website", "hasPet", "coatColor", "source"]);
    assert_settled(&form);
    Ok(())
}

#[test]
fn pet_details_appear_when_checked() -> Result<()> {
    let mut form = Form::from_json_str(PET_PROFILE)?;
    assert_eq!(section_ids(&form, 1), vec!["hasPet", "-", "coatColor"]);
    assert_eq!(form.visible_row_count(), 10);

    let settled = form.set_checked("hasPet", true)?;
    assert!(settled.structure_changed);
    assert_settled(&form);
    assert_eq!(
        section_ids(&form, 1),
        vec!["hasPet", "petName", "species", "-", "age", "coatColor"]
    );
    assert_eq!(form.visible_row_count(), 13);
    assert_eq!(form.value("age"), Some(&FieldValue::Number(1.0)));

    form.commit_input("petName", "Rex")?;
    form.select_option("species", "other")?;
    form.commit_input("age", "7 yrs")?;
    assert_settled(&form);
    assert_eq!(form.value("species"), Some(&FieldValue::from("exotic")));
    assert_eq!(form.value("age"), Some(&FieldValue::Number(7.0)));
    Ok(())
}

#[test]
fn hidden_section_still_contributes() -> Result<()> {
    let form = Form::from_json_str(PET_PROFILE)?;
    assert!(form.fields_in_section(3).is_empty());
    assert_eq!(form.value("source"), Some(&FieldValue::from("demo")));
    Ok(())
}

#[test]
fn radio_group_drives_slider() -> Result<()> {
    let mut form = Form::from_json_str(PET_PROFILE)?;
    assert!(!form.field("walks").expect("walks").is_enabled());

    form.set_checked("sizeLarge", true)?;
    assert_settled(&form);
    assert_eq!(form.value("size"), Some(&FieldValue::from("large")));
    assert!(form.field("walks").expect("walks").is_enabled());

    form.commit_input("walks", "3.6")?;
    assert_eq!(form.value("walks"), Some(&FieldValue::Number(4.0)));

    form.set_checked("sizeSmall", true)?;
    assert_settled(&form);
    assert!(!form.field("sizeLarge").expect("sizeLarge").is_checked());
    assert_eq!(form.value("size"), Some(&FieldValue::from("small")));
    assert!(!form.field("walks").expect("walks").is_enabled());
    assert!(!form.values().contains("walks"));
    Ok(())
}

#[test]
fn colour_and_url_input_is_normalised() -> Result<()> {
    let mut form = Form::from_json_str(PET_PROFILE)?;
    form.commit_input("coatColor", "rgb(255, 0, 0)")?;
    assert_eq!(form.value("coatColor"), Some(&FieldValue::from("#ff0000")));

    form.commit_input("coatColor", "not a colour")?;
    assert_eq!(form.value("coatColor"), Some(&FieldValue::from("#ff0000")));

    form.commit_input("website", "definitely not a url")?;
    let website = form.value("website").and_then(FieldValue::as_url).map(|u| u.as_str());
    assert_eq!(website, Some("https://rune.dev/"));
    Ok(())
}

#[test]
fn unknown_option_is_reported() -> Result<()> {
    let mut form = Form::from_json_str(PET_PROFILE)?;
    form.set_checked("hasPet", true)?;
    let err = form.select_option("species", "ferret").unwrap_err();
    assert!(matches!(err, FormError::UnknownOption { ref key, .. } if key == "ferret"));
    Ok(())
}
