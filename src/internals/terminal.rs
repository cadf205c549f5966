use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Write};

/// Clear the screen and home the cursor
pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    out.queue(Clear(ClearType::All))?;
    out.queue(MoveTo(0, 0))?;
    out.flush()
}
