use crate::error::Error;
use serde_json::Value;
use std::fmt;

/// The arguments of a socket event, in the order the peer sent them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    args: Vec<Value>,
}

impl Payload {
    pub fn new(args: Vec<Value>) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn first(&self) -> Option<&Value> {
        self.args.first()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn into_args(self) -> Vec<Value> {
        self.args
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::new(vec![value])
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned()).into()
    }
}

impl From<&Error> for Payload {
    fn from(err: &Error) -> Self {
        match err {
            Error::ConnectRefused(data) => data.clone().into(),
            other => other.to_string().as_str().into(),
        }
    }
}

/// Arguments are separated by a space. Strings print without quotes,
/// everything else as compact JSON.
impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, arg) in self.args.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            match arg {
                Value::String(string) => f.write_str(string)?,
                other => write!(f, "{}", other)?,
            }
        }
        Ok(())
    }
}
