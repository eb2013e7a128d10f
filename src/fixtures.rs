#[cfg(test)]
pub mod test {
    use std::path::Path;

    use crate::discover::Declaration;
    use crate::handler::{ColorHandler, PathHandler, Rejection, TypeHandler};
    use crate::value::Value;

    /// A user-defined handler: integers that may not be negative.
    #[derive(Debug)]
    pub struct NonNegative;

    impl TypeHandler for NonNegative {
        fn name(&self) -> &str {
            "non-negative int"
        }

        fn load(&self, raw: &Value) -> Result<Value, Rejection> {
            match raw {
                Value::Int(i) => Ok(Value::Int(*i)),
                Value::Str(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|e| Rejection::new(e.to_string())),
                other => Err(Rejection::new(format!("not an integer: {other}"))),
            }
        }

        fn is_valid(&self, value: &Value) -> bool {
            matches!(value, Value::Int(i) if *i >= 0)
        }
    }

    /// `name = "John"`, `age = 42` (non-negative).
    pub fn person() -> Declaration {
        Declaration::new()
            .field("name", "John")
            .field("age", 42)
            .typed("age", NonNegative)
    }

    pub fn person_at(path: &Path) -> Declaration {
        person().storage_path(path)
    }

    pub fn wall_colors() -> Declaration {
        Declaration::new()
            .field("east", Value::tuple([255, 0, 0]))
            .typed("east", ColorHandler)
            .hint("east", "The color of the eastern wall")
            .field("west", Value::tuple([0, 255, 0]))
            .typed("west", ColorHandler)
            .hint("west", "The color of the western wall")
            .field("north", Value::tuple([0, 0, 255]))
            .typed("north", ColorHandler)
            .field("south", "#000")
            .typed("south", ColorHandler)
    }

    pub fn colors() -> Declaration {
        Declaration::new()
            .field("light", Value::tuple([255, 255, 255]))
            .typed("light", ColorHandler)
            .hint("light", "The color of your lights")
            .nested("walls", wall_colors())
            .hint("walls", "The colors of the walls of your secret place")
            .nested("castle", wall_colors())
            .hint("castle", "The colors of the walls of your castle")
    }

    /// A nested declaration with custom handlers, hints, and a private attribute.
    pub fn rooms() -> Declaration {
        Declaration::new()
            .version(1)
            .field("age", 3)
            .field("name", "Archibald")
            .hint("name", "Your name")
            .field("documents", ".")
            .typed("documents", PathHandler)
            .hint("documents", "The path to your documents folder")
            .field("bald", true)
            .hint("bald", "Are you bald ?")
            .field("_scratch", 0)
            .nested("colors", colors())
            .hint("colors", "The colors around you.")
    }

    pub fn rooms_at(path: &Path) -> Declaration {
        rooms().storage_path(path)
    }

    #[test]
    fn non_negative_rejects_negatives() {
        let loaded = NonNegative.load(&Value::from("-1")).unwrap();
        assert!(!NonNegative.is_valid(&loaded));
        assert!(NonNegative.is_valid(&Value::Int(0)));
    }
}
