// MIT LICENSE
//
// Copyright (c) 2021 Dash Core Group
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! Visualize

use std::io::{Result, Write};

use itertools::Itertools;

static INDENT_SPACES: usize = 2;

/// Pretty text rendering of nestree components.
pub trait Visualize {
    fn visualize<W: Write>(&self, drawer: Drawer<W>) -> Result<Drawer<W>>;
}

/// A `io::Write` proxy that indents every new line by the current level, so
/// nested structures render as an outline.
pub struct Drawer<W: Write> {
    level: usize,
    write: W,
}

impl<W: Write> Drawer<W> {
    pub fn new(write: W) -> Self {
        Drawer { level: 0, write }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn down(&mut self) {
        self.level += 1;
    }

    pub fn up(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Writes `buf`, indenting whatever follows a line break.
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        let mut sep = vec![b'\n'];
        sep.extend(std::iter::repeat(b' ').take(INDENT_SPACES * self.level));
        for chunk in Itertools::intersperse(buf.split(|c| *c == b'\n'), sep.as_slice()) {
            self.write.write_all(chunk)?;
        }
        Ok(())
    }

    /// Starts a new indented line.
    pub fn newline(&mut self) -> Result<()> {
        self.write(b"\n")
    }

    pub fn flush(&mut self) -> Result<()> {
        self.write.write_all(b"\n")?;
        self.write.flush()
    }
}

impl Visualize for u64 {
    fn visualize<W: Write>(&self, mut drawer: Drawer<W>) -> Result<Drawer<W>> {
        drawer.write(self.to_string().as_bytes())?;
        Ok(drawer)
    }
}

impl Visualize for [u64] {
    fn visualize<W: Write>(&self, mut drawer: Drawer<W>) -> Result<Drawer<W>> {
        drawer.write(format!("({})", self.iter().join(", ")).as_bytes())?;
        Ok(drawer)
    }
}

impl Visualize for Vec<u64> {
    fn visualize<W: Write>(&self, drawer: Drawer<W>) -> Result<Drawer<W>> {
        self.as_slice().visualize(drawer)
    }
}

impl<T: Visualize + ?Sized> Visualize for &T {
    fn visualize<W: Write>(&self, drawer: Drawer<W>) -> Result<Drawer<W>> {
        (*self).visualize(drawer)
    }
}

impl<T: Visualize> Visualize for Option<T> {
    fn visualize<W: Write>(&self, mut drawer: Drawer<W>) -> Result<Drawer<W>> {
        Ok(if let Some(v) = self {
            v.visualize(drawer)?
        } else {
            drawer.write(b"None")?;
            drawer
        })
    }
}

/// `visualize` shortcut to write straight into stdout offhand
pub fn visualize_stdout<T: Visualize + ?Sized>(value: &T) {
    let mut out = std::io::stdout();
    let drawer = Drawer::new(&mut out);
    value
        .visualize(drawer)
        .and_then(|mut drawer| drawer.flush())
        .expect("IO error when trying to `visualize`");
}

/// `visualize` shortcut to write into provided buffer, should be a `Vec` not a
/// slice because slices won't grow if needed.
pub fn visualize_to_vec<T: Visualize + ?Sized>(v: &mut Vec<u8>, value: &T) {
    let drawer = Drawer::new(v);
    value
        .visualize(drawer)
        .expect("error while writing into vector");
}

/// Renders into a `String`.
pub fn visualize_to_string<T: Visualize + ?Sized>(value: &T) -> String {
    let mut v = Vec::new();
    visualize_to_vec(&mut v, value);
    String::from_utf8_lossy(&v).into_owned()
}
