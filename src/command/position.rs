use super::CommandKind;

/// `position [startpos] moves <moves>`: set up the position to search.
///
/// `fen_string` carries the move list appended after `moves`. When it is
/// empty the `moves` token is left out.
#[derive(Debug, Clone, Default)]
pub struct Position {
    pub is_start_position: bool,
    pub fen_string: String,
}

impl Position {
    /// The start position followed by `moves` (space-separated, long
    /// algebraic notation).
    pub fn startpos(moves: impl Into<String>) -> Self {
        Position {
            is_start_position: true,
            fen_string: moves.into(),
        }
    }

    /// Append one move to the list.
    pub fn push_move(&mut self, mv: &str) {
        if !self.fen_string.is_empty() {
            self.fen_string.push(' ');
        }
        self.fen_string.push_str(mv);
    }
}

impl CommandKind for Position {
    const NAME: &'static str = "position";

    fn request_lines(&self) -> Vec<String> {
        let mut text = String::from("position");
        if self.is_start_position {
            text.push_str(" startpos");
        }
        let moves = self.fen_string.trim();
        if !moves.is_empty() {
            text.push_str(" moves ");
            text.push_str(moves);
        }
        vec![text]
    }
}
