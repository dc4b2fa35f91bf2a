//! Steps cubiertos por datos predefinidos del host.
//!
//! Se evalúa una sola vez, antes de empezar la presentación; cambios
//! posteriores en los datos predefinidos no afectan a un flujo en curso.
use std::collections::BTreeSet;

use idv_domain::{PredefinedUserInfo, StepKind};

pub type SkipSet = BTreeSet<StepKind>;

/// - `email` si hay email.
/// - `sms` si hay teléfono.
/// - `userInfo` sólo si nombre, apellido y fecha de nacimiento están completos.
pub fn skippable_steps(predefined: &PredefinedUserInfo) -> SkipSet {
    let mut set = SkipSet::new();
    if predefined.has_email() {
        set.insert(StepKind::Email);
    }
    if predefined.has_phone_number() {
        set.insert(StepKind::Sms);
    }
    if predefined.has_complete_identity() {
        set.insert(StepKind::UserInfo);
    }
    set
}
