//! Declaration of the demo's configuration tree.
//!
//! ```text
//! age, name, documents, bald, favorite_numbers
//! colors
//!     light
//!     walls   east, west, north, south
//!     castle  east, west, north, south
//! ```

use configtree::{ColorHandler, Declaration, IntHandler, PathHandler, StorageLocation, Value};

fn wall_colors() -> Declaration {
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

fn colors() -> Declaration {
    Declaration::new()
        .field("light", Value::tuple([255, 255, 255]))
        .typed("light", ColorHandler)
        .hint("light", "The color of your lights")
        .nested("walls", wall_colors())
        .hint("walls", "The colors of the walls of your secret place")
        .nested("castle", wall_colors())
        .hint("castle", "The colors of the walls of your castle")
}

/// The demo's root declaration, stored in `./configtree-demo.json`.
///
/// Set `CONFIGTREE_DEMO_KEY` to obfuscate the stored file.
pub fn declaration() -> Declaration {
    let decl = Declaration::new()
        .storage_in(StorageLocation::Cwd, "configtree-demo.json")
        .version(1)
        .field("age", 3)
        .typed("age", IntHandler::new().min(0).max(150))
        .hint("age", "How old you are")
        .field("name", "Archibald")
        .hint("name", "Your name")
        .field("documents", ".")
        .typed("documents", PathHandler)
        .hint("documents", "The path to your documents folder")
        .field("bald", true)
        .hint("bald", "Are you bald ?")
        .field("favorite_numbers", vec![3, 7, 42])
        .nested("colors", colors())
        .hint("colors", "The colors around you.");

    match std::env::var("CONFIGTREE_DEMO_KEY") {
        Ok(key) => decl.obfuscation_key(key),
        Err(_) => decl,
    }
}
