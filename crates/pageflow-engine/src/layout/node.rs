use crate::error::{EngineError, Result};
use crate::model::{NodeId, TypeTag};
use crate::registry::PageSpec;

/// The atomic unit of line breaking: one measured word (or the block-end
/// break slot). Never split further; a box wider than the line is placed
/// alone.
#[derive(Debug, Clone, PartialEq)]
pub struct WordBox {
    pub text: String,
    pub width: f64,
    pub height: f64,
    pub(crate) selectable: usize,
    pub block: NodeId,
    pub tag: TypeTag,
    pub is_break: bool,
}

impl WordBox {
    /// Selectable span covered by this box.
    pub fn size(&self) -> usize {
        self.selectable
    }
}

/// One laid-out line. Lines never span blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    pub(crate) boxes: Vec<WordBox>,
    pub block: NodeId,
    pub(crate) size: usize,
    pub width: f64,
    pub height: f64,
}

impl LineBox {
    pub fn boxes(&self) -> &[WordBox] {
        &self.boxes
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// One page of stacked lines.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBox {
    pub(crate) lines: Vec<LineBox>,
    pub(crate) size: usize,
    pub height: f64,
}

impl PageBox {
    pub fn lines(&self) -> &[LineBox] {
        &self.lines
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Index path of a line: page, then line within the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAddress {
    pub page: usize,
    pub line: usize,
}

/// Index path of a word box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxAddress {
    pub page: usize,
    pub line: usize,
    pub word: usize,
}

impl BoxAddress {
    pub fn line_address(&self) -> LineAddress {
        LineAddress {
            page: self.page,
            line: self.line,
        }
    }
}

/// Scan direction for cumulative-size search.
///
/// `Forward` scans ascending from the document start with half-open spans
/// `[start, end)`; `Backward` scans descending from the end with spans
/// `(start, end]`. Both are needed: boundary searches run forward for
/// "next" and backward for "previous" queries, and the two resolve an
/// offset sitting exactly on a node edge to different sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Forward,
    Backward,
}

/// Reference to a layout node for pointer hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutNodeRef {
    Page(usize),
    Line(LineAddress),
    Word(BoxAddress),
}

/// The paginated layout of one document.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    pub(crate) page_spec: PageSpec,
    pub(crate) pages: Vec<PageBox>,
    pub(crate) size: usize,
}

impl LayoutTree {
    pub fn page_spec(&self) -> PageSpec {
        self.page_spec
    }

    pub fn pages(&self) -> &[PageBox] {
        &self.pages
    }

    /// Total selectable span; equals the render tree's selectable size.
    pub fn selectable_size(&self) -> usize {
        self.size
    }

    /// Last valid caret position (the final block's end slot).
    pub fn last_caret(&self) -> usize {
        self.size.saturating_sub(1)
    }

    pub fn line(&self, address: LineAddress) -> Option<&LineBox> {
        self.pages.get(address.page)?.lines.get(address.line)
    }

    pub fn word(&self, address: BoxAddress) -> Option<&WordBox> {
        self.line(address.line_address())?.boxes.get(address.word)
    }

    /// Locate the word box containing a selectable offset, plus the offset
    /// local to the box.
    ///
    /// `Bias::Forward` walks pages/lines/boxes ascending and treats spans
    /// as `[start, end)`, returning a local offset in `[0, size)`.
    /// `Bias::Backward` walks descending from the document end with spans
    /// `(start, end]`, returning a local offset in `[1, size]` (offset 0
    /// falls back to the forward scan).
    pub fn locate_box(&self, offset: usize, bias: Bias) -> Result<(BoxAddress, usize)> {
        if offset >= self.size {
            return Err(EngineError::OutOfRange {
                offset,
                size: self.size,
                context: "layout selectable span",
            });
        }
        match bias {
            Bias::Forward => self.locate_forward(offset),
            Bias::Backward if offset == 0 => self.locate_forward(0),
            Bias::Backward => self.locate_backward(offset),
        }
    }

    fn locate_forward(&self, offset: usize) -> Result<(BoxAddress, usize)> {
        let mut remaining = offset;
        for (page_index, page) in self.pages.iter().enumerate() {
            if remaining >= page.size {
                remaining -= page.size;
                continue;
            }
            for (line_index, line) in page.lines.iter().enumerate() {
                if remaining >= line.size {
                    remaining -= line.size;
                    continue;
                }
                for (word_index, word) in line.boxes.iter().enumerate() {
                    if remaining >= word.selectable {
                        remaining -= word.selectable;
                        continue;
                    }
                    return Ok((
                        BoxAddress {
                            page: page_index,
                            line: line_index,
                            word: word_index,
                        },
                        remaining,
                    ));
                }
            }
        }
        Err(EngineError::OutOfRange {
            offset,
            size: self.size,
            context: "layout selectable span",
        })
    }

    fn locate_backward(&self, offset: usize) -> Result<(BoxAddress, usize)> {
        let mut end = self.size;
        for (page_index, page) in self.pages.iter().enumerate().rev() {
            if offset <= end - page.size {
                end -= page.size;
                continue;
            }
            for (line_index, line) in page.lines.iter().enumerate().rev() {
                if offset <= end - line.size {
                    end -= line.size;
                    continue;
                }
                for (word_index, word) in line.boxes.iter().enumerate().rev() {
                    if offset <= end - word.selectable {
                        end -= word.selectable;
                        continue;
                    }
                    return Ok((
                        BoxAddress {
                            page: page_index,
                            line: line_index,
                            word: word_index,
                        },
                        offset - (end - word.selectable),
                    ));
                }
            }
        }
        Err(EngineError::OutOfRange {
            offset,
            size: self.size,
            context: "layout selectable span",
        })
    }

    /// Selectable offset of the first position of a line.
    pub fn line_start_offset(&self, address: LineAddress) -> Result<usize> {
        let page = self
            .pages
            .get(address.page)
            .ok_or(EngineError::OutOfRange {
                offset: address.page,
                size: self.pages.len(),
                context: "page index",
            })?;
        if address.line >= page.lines.len() {
            return Err(EngineError::OutOfRange {
                offset: address.line,
                size: page.lines.len(),
                context: "line index",
            });
        }
        let before_page: usize = self.pages[..address.page].iter().map(|p| p.size).sum();
        let before_line: usize = page.lines[..address.line].iter().map(|l| l.size).sum();
        Ok(before_page + before_line)
    }

    /// Selectable offset of the first position of a word box.
    pub fn box_start_offset(&self, address: BoxAddress) -> Result<usize> {
        let start = self.line_start_offset(address.line_address())?;
        let line = self
            .line(address.line_address())
            .ok_or(EngineError::OutOfRange {
                offset: address.line,
                size: 0,
                context: "line index",
            })?;
        if address.word >= line.boxes.len() {
            return Err(EngineError::OutOfRange {
                offset: address.word,
                size: line.boxes.len(),
                context: "word index",
            });
        }
        let before: usize = line.boxes[..address.word].iter().map(|b| b.selectable).sum();
        Ok(start + before)
    }

    /// Next word box at the same depth, crossing line and page boundaries.
    pub fn next_box(&self, address: BoxAddress) -> Option<BoxAddress> {
        let line = self.line(address.line_address())?;
        if address.word + 1 < line.boxes.len() {
            return Some(BoxAddress {
                word: address.word + 1,
                ..address
            });
        }
        let next = self.next_line(address.line_address())?;
        Some(BoxAddress {
            page: next.page,
            line: next.line,
            word: 0,
        })
    }

    /// Previous word box at the same depth, crossing line and page
    /// boundaries.
    pub fn previous_box(&self, address: BoxAddress) -> Option<BoxAddress> {
        if address.word > 0 {
            return Some(BoxAddress {
                word: address.word - 1,
                ..address
            });
        }
        let previous = self.previous_line(address.line_address())?;
        let line = self.line(previous)?;
        Some(BoxAddress {
            page: previous.page,
            line: previous.line,
            word: line.boxes.len() - 1,
        })
    }

    /// Next line, crossing page boundaries.
    pub fn next_line(&self, address: LineAddress) -> Option<LineAddress> {
        let page = self.pages.get(address.page)?;
        if address.line + 1 < page.lines.len() {
            return Some(LineAddress {
                page: address.page,
                line: address.line + 1,
            });
        }
        if address.page + 1 < self.pages.len() {
            return Some(LineAddress {
                page: address.page + 1,
                line: 0,
            });
        }
        None
    }

    /// Previous line, crossing page boundaries (the cross-parent sibling
    /// of the first line on a page is the last line of the page before).
    pub fn previous_line(&self, address: LineAddress) -> Option<LineAddress> {
        if address.line > 0 {
            return Some(LineAddress {
                page: address.page,
                line: address.line - 1,
            });
        }
        if address.page > 0 {
            let page = self.pages.get(address.page - 1)?;
            return Some(LineAddress {
                page: address.page - 1,
                line: page.lines.len() - 1,
            });
        }
        None
    }

    /// Inverse screen mapping for pointer input: the document selectable
    /// offset of `local` within the referenced layout node.
    ///
    /// The local offset is clamped into the node's half-open span (at most
    /// `size - 1`): pointer events routinely land past the last position
    /// of a node and must still resolve inside it.
    pub fn resolve_position(&self, node: LayoutNodeRef, local: usize) -> Result<usize> {
        let (start, span) = match node {
            LayoutNodeRef::Page(index) => {
                let page = self.pages.get(index).ok_or(EngineError::OutOfRange {
                    offset: index,
                    size: self.pages.len(),
                    context: "page index",
                })?;
                let start: usize = self.pages[..index].iter().map(|p| p.size).sum();
                (start, page.size)
            }
            LayoutNodeRef::Line(address) => {
                let line = self.line(address).ok_or(EngineError::OutOfRange {
                    offset: address.line,
                    size: 0,
                    context: "line index",
                })?;
                (self.line_start_offset(address)?, line.size)
            }
            LayoutNodeRef::Word(address) => {
                let word = self.word(address).ok_or(EngineError::OutOfRange {
                    offset: address.word,
                    size: 0,
                    context: "word index",
                })?;
                (self.box_start_offset(address)?, word.selectable)
            }
        };
        Ok(start + local.min(span.saturating_sub(1)))
    }

    /// Content-relative x position of a selectable offset within its line.
    pub fn x_of_offset(&self, offset: usize) -> Result<f64> {
        let (address, local) = self.locate_box(offset, Bias::Forward)?;
        let line = self.line(address.line_address()).ok_or(EngineError::OutOfRange {
            offset: address.line,
            size: 0,
            context: "line index",
        })?;
        let mut x: f64 = line.boxes[..address.word].iter().map(|b| b.width).sum();
        let word = &line.boxes[address.word];
        if local > 0 && word.selectable > 0 {
            x += word.width * local as f64 / word.selectable as f64;
        }
        Ok(x)
    }

    /// Caret position for a content-relative x within a line, clamped into
    /// the line's caret range. Used by vertical navigation to honor the
    /// cursor's horizontal lock.
    pub fn offset_at_x(&self, address: LineAddress, x: f64) -> Result<usize> {
        let line = self.line(address).ok_or(EngineError::OutOfRange {
            offset: address.line,
            size: 0,
            context: "line index",
        })?;
        let start = self.line_start_offset(address)?;
        let mut cumulated = 0.0;
        let mut consumed = 0usize;
        for word in &line.boxes {
            if word.is_break || word.width <= 0.0 {
                break;
            }
            if x < cumulated + word.width {
                let advance = word.width / word.selectable as f64;
                let local = ((x - cumulated) / advance).round() as usize;
                return Ok((start + consumed + local.min(word.selectable))
                    .min(self.caret_end(address)?));
            }
            cumulated += word.width;
            consumed += word.selectable;
        }
        self.caret_end(address)
    }

    /// Last caret position of a line: one before the line's end when the
    /// line closes with the block break or trailing whitespace, the line
    /// end itself otherwise (an over-wide box without trailing space).
    pub fn caret_end(&self, address: LineAddress) -> Result<usize> {
        let line = self.line(address).ok_or(EngineError::OutOfRange {
            offset: address.line,
            size: 0,
            context: "line index",
        })?;
        let start = self.line_start_offset(address)?;
        let stops_short = line.boxes.last().is_some_and(|word| {
            word.is_break || word.text.chars().next_back().is_some_and(char::is_whitespace)
        });
        if stops_short {
            Ok(start + line.size - 1)
        } else {
            Ok(start + line.size)
        }
    }
}
