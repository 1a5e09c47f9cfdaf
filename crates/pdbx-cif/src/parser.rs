use std::collections::{HashMap, HashSet};

use pdbx_core::{DataCategory, DataContainer, ModelError};

use crate::error::{CifError, Position};
use crate::lexer::{SpannedToken, Tokenizer};
use crate::token::Token;

/// How a category was introduced within one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Item,
    Loop,
}

/// A data block or save frame under construction.
struct Scope {
    container: DataContainer,
    forms: HashMap<String, Form>,
}

impl Scope {
    fn new(container: DataContainer) -> Self {
        Self {
            container,
            forms: HashMap::new(),
        }
    }
}

/// An open `save_<name>` frame.
struct Frame {
    name: String,
    position: Position,
    scope: Scope,
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

fn model_error(position: Position) -> impl FnOnce(ModelError) -> CifError {
    move |source| CifError::Model { source, position }
}

/// Recursive descent parser over a lazy token stream.
///
/// Iterating yields one [`DataContainer`] per `data_` block, each only
/// once it has parsed completely. The first error ends the iteration.
pub struct Parser<'src> {
    tokens: Tokenizer<'src>,
    peeked: Option<SpannedToken>,
    done: bool,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            tokens: Tokenizer::new(source),
            peeked: None,
            done: false,
        }
    }

    // -- Cursor helpers --

    fn next_token(&mut self) -> Result<SpannedToken, CifError> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        match self.tokens.next() {
            Some(result) => result,
            None => Ok(self.tokens.end_of_input()),
        }
    }

    fn peek(&mut self) -> Result<&SpannedToken, CifError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.next_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    /// Consumes the next token if it is a value.
    fn next_value(&mut self) -> Result<Option<String>, CifError> {
        let token = self.next_token()?;
        match token.token {
            Token::BareValue(text) | Token::TextField(text) | Token::QuotedValue { text, .. } => {
                Ok(Some(text))
            }
            _ => {
                self.peeked = Some(token);
                Ok(None)
            }
        }
    }

    fn found(token: &SpannedToken) -> String {
        match token.token {
            Token::EndOfInput => token.token.description().to_string(),
            _ => format!("{} ('{}')", token.token.description(), token.text),
        }
    }

    // -- Grammar productions --

    /// container = (DataKeyword | GlobalKeyword) (category_block | loop_block | save_frame)*
    fn parse_container(&mut self) -> Result<Option<DataContainer>, CifError> {
        let header = self.next_token()?;
        let container = match header.token {
            Token::EndOfInput => return Ok(None),
            Token::DataKeyword(name) => {
                DataContainer::new(name).map_err(model_error(header.position))?
            }
            Token::GlobalKeyword => DataContainer::global(),
            _ => {
                return Err(CifError::OutsideDataBlock {
                    found: Self::found(&header),
                    position: header.position,
                })
            }
        };

        let mut block = Scope::new(container);
        let mut frame: Option<Frame> = None;

        loop {
            let token = self.next_token()?;
            let position = token.position;
            let scope = match frame.as_mut() {
                Some(frame) => &mut frame.scope,
                None => &mut block,
            };
            match token.token {
                Token::EndOfInput | Token::DataKeyword(_) | Token::GlobalKeyword => {
                    self.peeked = Some(token);
                    break;
                }
                Token::Tag {
                    category,
                    attribute,
                } => self.parse_item(scope, category, attribute, position)?,
                Token::LoopKeyword => self.parse_loop(scope, position)?,
                Token::SaveKeyword(name) if name.is_empty() => match frame.take() {
                    Some(open) => merge_frame(&mut block, open, position)?,
                    None => return Err(CifError::StraySaveTerminator { position }),
                },
                Token::SaveKeyword(name) => {
                    if let Some(open) = &frame {
                        return Err(CifError::NestedSaveFrame {
                            name,
                            outer: open.name.clone(),
                            position,
                        });
                    }
                    let container = DataContainer::new(name.clone()).map_err(model_error(position))?;
                    frame = Some(Frame {
                        name,
                        position,
                        scope: Scope::new(container),
                    });
                }
                _ => {
                    return Err(CifError::UnexpectedToken {
                        expected: "tag, loop_, save_ or data_".into(),
                        found: Self::found(&token),
                        position,
                    })
                }
            }
        }

        if let Some(open) = frame {
            return Err(CifError::UnterminatedSaveFrame {
                name: open.name,
                position: open.position,
            });
        }

        tracing::trace!(
            container = block.container.name(),
            categories = block.container.len(),
            "parsed data block"
        );
        Ok(Some(block.container))
    }

    /// category_block = Tag value
    fn parse_item(
        &mut self,
        scope: &mut Scope,
        category: String,
        attribute: String,
        position: Position,
    ) -> Result<(), CifError> {
        let item = format!("_{category}.{attribute}");
        let Some(value) = self.next_value()? else {
            let token = self.next_token()?;
            if token.token == Token::EndOfInput {
                return Err(CifError::UnexpectedEndOfInput {
                    expected: format!("value for {item}"),
                    position: token.position,
                });
            }
            return Err(CifError::MissingValue {
                item,
                found: Self::found(&token),
                position: token.position,
            });
        };

        let key = fold(&category);
        if scope.forms.get(&key) == Some(&Form::Loop) {
            return Err(CifError::DuplicateCategory { category, position });
        }
        let target = scope
            .container
            .category_or_insert(&category)
            .map_err(model_error(position))?;
        if target.has_attribute(&attribute) {
            return Err(CifError::DuplicateAttribute {
                category: target.name().to_string(),
                attribute,
                position,
            });
        }
        target
            .set_value(attribute, value)
            .map_err(model_error(position))?;
        scope.forms.insert(key, Form::Item);
        Ok(())
    }

    /// loop_block = LoopKeyword Tag+ value+ StopKeyword?
    fn parse_loop(&mut self, scope: &mut Scope, position: Position) -> Result<(), CifError> {
        let first = self.next_token()?;
        let (category, attribute) = match first.token {
            Token::Tag {
                category,
                attribute,
            } => (category, attribute),
            Token::EndOfInput => {
                return Err(CifError::UnexpectedEndOfInput {
                    expected: "tag after loop_".into(),
                    position: first.position,
                })
            }
            _ => {
                return Err(CifError::UnexpectedToken {
                    expected: "tag after loop_".into(),
                    found: Self::found(&first),
                    position: first.position,
                })
            }
        };

        let key = fold(&category);
        let mut seen = HashSet::from([fold(&attribute)]);
        let mut attributes = vec![attribute];
        loop {
            let token = self.next_token()?;
            match token.token {
                Token::Tag {
                    category: other,
                    attribute,
                } => {
                    if fold(&other) != key {
                        return Err(CifError::LoopCategoryChanged {
                            expected: category,
                            found: other,
                            position: token.position,
                        });
                    }
                    if !seen.insert(fold(&attribute)) {
                        return Err(CifError::DuplicateAttribute {
                            category,
                            attribute,
                            position: token.position,
                        });
                    }
                    attributes.push(attribute);
                }
                _ => {
                    self.peeked = Some(token);
                    break;
                }
            }
        }

        let mut values = Vec::new();
        while let Some(value) = self.next_value()? {
            values.push(value);
        }
        if values.is_empty() {
            let next = self.peek()?;
            if next.token == Token::EndOfInput {
                return Err(CifError::UnexpectedEndOfInput {
                    expected: format!("values for loop '{category}'"),
                    position: next.position,
                });
            }
            return Err(CifError::EmptyLoop { category, position });
        }
        if values.len() % attributes.len() != 0 {
            return Err(CifError::LoopValueCount {
                category,
                columns: attributes.len(),
                values: values.len(),
                position,
            });
        }
        if self.peek()?.token == Token::StopKeyword {
            self.next_token()?;
        }

        if scope.forms.contains_key(&key) {
            return Err(CifError::DuplicateCategory { category, position });
        }
        let columns = attributes.len();
        let mut table =
            DataCategory::with_attributes(category, attributes).map_err(model_error(position))?;
        let mut values = values.into_iter();
        for _ in 0..values.len() / columns {
            table
                .append_row(values.by_ref().take(columns))
                .map_err(model_error(position))?;
        }
        scope
            .container
            .add(table)
            .map_err(model_error(position))?;
        scope.forms.insert(key, Form::Loop);
        Ok(())
    }
}

/// Folds a closed save frame into its data block.
///
/// New categories are appended. A category the block already has gains
/// the frame's rows, matched by attribute name; columns missing on either
/// side are filled with `?`.
fn merge_frame(block: &mut Scope, frame: Frame, position: Position) -> Result<(), CifError> {
    let Frame { name, scope, .. } = frame;
    let count = scope.container.len();
    for category in scope.container {
        let key = fold(category.name());
        match block.container.category_mut(category.name()) {
            None => block.container.add(category).map_err(model_error(position))?,
            Some(existing) => existing
                .extend_rows(category)
                .map_err(model_error(position))?,
        }
        block.forms.insert(key, Form::Loop);
    }
    tracing::debug!(frame = %name, categories = count, "merged save frame");
    Ok(())
}

impl Iterator for Parser<'_> {
    type Item = Result<DataContainer, CifError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.parse_container() {
            Ok(Some(container)) => Some(Ok(container)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Parser<'_> {}

/// Returns a lazy iterator over the data blocks in `source`.
pub fn containers(source: &str) -> Parser<'_> {
    Parser::new(source)
}

/// Parses every data block in `source`.
///
/// # Errors
///
/// Returns the first lexical, structural, or end-of-stream error. No
/// containers are returned when any block fails.
pub fn parse(source: &str) -> Result<Vec<DataContainer>, CifError> {
    Parser::new(source).collect()
}
