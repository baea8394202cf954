use std::env;
use std::str::FromStr;

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("must define {} environment variable", name))
}

/// Returns the value of the named environment variable, or `default`
/// if it is not set.
pub fn get_variable_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Parses the value of the named environment variable or panics,
/// naming the variable and the expected type.
pub fn parse_variable<T: FromStr>(name: &str, default: Option<&str>) -> T {
    let value = match default {
        Some(default) => get_variable_or(name, default),
        None => get_variable(name),
    };

    value.parse().unwrap_or_else(|_| {
        panic!(
            "parse {} as {}: {:?}",
            name,
            std::any::type_name::<T>(),
            value
        )
    })
}

/// Where feedback is kept.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Storage {
    Postgres,
    Memory,
}

impl FromStr for Storage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(Storage::Postgres),
            "memory" => Ok(Storage::Memory),
            _ => Err(format!("unknown storage {:?}", s)),
        }
    }
}
