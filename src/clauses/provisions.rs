// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::{
    config::EngineConfig,
    record::{CanonicalDataRecord, PetProvision, TrustStage},
    resolver::resolve,
};

use super::{escape_text, non_blank};

/// Staged distribution to a minor beneficiary, in declared order.
/// `None` (or an empty schedule) means everything vests at the age of majority.
pub fn render_trust_schedule(stages: Option<&[TrustStage]>) -> String {
    let stages = match stages {
        None | Some([]) => return "the whole of the share upon attaining the age of majority".to_string(),
        Some(stages) => stages,
    };

    let mut text = String::from("<ul>");
    for stage in stages {
        text.push_str(&format!(
            "<li>{}% of the share upon attaining the age of {}</li>",
            format_percent(stage.share_percent),
            stage.age
        ));
    }
    text.push_str("</ul>");
    text
}

fn format_percent(percent: f64) -> String {
    if percent.fract() == 0.0 {
        format!("{:.0}", percent)
    } else {
        percent.to_string()
    }
}

pub fn render_pets(pets: &[PetProvision], record: &CanonicalDataRecord, config: &EngineConfig) -> Vec<String> {
    pets.iter().map(|pet| render_pet(pet, record, config)).collect()
}

fn render_pet(pet: &PetProvision, record: &CanonicalDataRecord, config: &EngineConfig) -> String {
    let name = escape_text(pet.pet_name.trim());
    let caretaker = resolve(&pet.caretaker, record, config);

    let mut text = format!("<li>I give my pet {} to {}", name, escape_text(&caretaker.describe()));
    if let Some(backup) = config.backup(pet.backup.as_deref()) {
        text.push_str(&format!(
            ", or if {} is unable or unwilling to care for {}, to {}",
            escape_text(caretaker.display_name()),
            name,
            escape_text(&resolve(backup, record, config).describe())
        ));
    }
    if let Some(fund) = non_blank(pet.fund_amount.as_deref()).filter(|fund| !config.is_none_token(fund)) {
        text.push_str(&format!(
            ", together with the sum of {} for {}'s care",
            escape_text(fund),
            name
        ));
    }
    text.push_str(".</li>");
    text
}
