//! The closed genre enumeration stored as one 0/1 column per genre on `game`.

/// A genre: the `game` column that stores it and the tag label the
/// metadata API uses for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    pub column: &'static str,
    pub label: &'static str,
}

const fn genre(column: &'static str, label: &'static str) -> Genre {
    Genre { column, label }
}

/// Column order of the genre vector. The `game` table declares the same
/// columns in the same order.
pub const GENRES: [Genre; 19] = [
    genre("action", "Action"),
    genre("indie", "Indie"),
    genre("adventure", "Adventure"),
    genre("rpg", "RPG"),
    genre("strategy", "Strategy"),
    genre("shooter", "Shooter"),
    genre("casual", "Casual"),
    genre("simulation", "Simulation"),
    genre("puzzle", "Puzzle"),
    genre("arcade", "Arcade"),
    genre("platformer", "Platformer"),
    genre("massively_multiplayer", "Massively Multiplayer"),
    genre("racing", "Racing"),
    genre("sports", "Sports"),
    genre("fighting", "Fighting"),
    genre("family", "Family"),
    genre("board_games", "Board Games"),
    genre("card", "Card"),
    genre("educational", "Educational"),
];

/// Dense 0/1 vector over [`GENRES`].
pub type GenreVector = [u8; GENRES.len()];

/// Map raw tags onto the enumeration. Position `i` is 1 iff
/// `GENRES[i].label` appears verbatim among `tags`; unknown tags are ignored.
pub fn genre_vector<S: AsRef<str>>(tags: &[S]) -> GenreVector {
    let mut vector = [0u8; GENRES.len()];
    for (slot, genre) in vector.iter_mut().zip(GENRES.iter()) {
        if tags.iter().any(|tag| tag.as_ref() == genre.label) {
            *slot = 1;
        }
    }
    vector
}

pub fn genre_columns() -> impl Iterator<Item = &'static str> {
    GENRES.iter().map(|g| g.column)
}
