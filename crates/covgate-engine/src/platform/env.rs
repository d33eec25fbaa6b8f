use std::collections::BTreeMap;

use covgate_core::traits::EnvironmentSource;

/// The current process environment, every pair kept verbatim. Names and
/// values that are not valid UTF-8 are converted lossily.
pub struct ProcessEnvironment;

impl EnvironmentSource for ProcessEnvironment {
    fn vars(&self) -> BTreeMap<String, String> {
        std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }
}
