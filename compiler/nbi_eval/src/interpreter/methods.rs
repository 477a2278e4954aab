//! Methods of builtin types: `list.append`, `dict.get`, `str.split` and the
//! rest of the native method table.

use std::rc::Rc;

use super::{CallArgs, EvalResult, Interpreter};
use crate::value::{Builtin, Complex, Property, SetValue, Value};

/// Text encodings understood by `str.encode` and `bytes.decode`.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Codec {
    Utf8,
    Ascii,
    Latin1,
}

impl Codec {
    fn named(name: &str) -> Option<Codec> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Some(Codec::Utf8),
            "ascii" | "us-ascii" => Some(Codec::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" => Some(Codec::Latin1),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Codec::Utf8 => "utf-8",
            Codec::Ascii => "ascii",
            Codec::Latin1 => "latin-1",
        }
    }

    /// Encoded bytes, or the first character the codec cannot represent.
    fn encode(self, text: &str) -> Result<Vec<u8>, (usize, char)> {
        let limit = match self {
            Codec::Utf8 => return Ok(text.as_bytes().to_vec()),
            Codec::Ascii => 0x80,
            Codec::Latin1 => 0x100,
        };
        text.chars()
            .enumerate()
            .map(|(position, c)| {
                let code = u32::from(c);
                if code < limit {
                    u8::try_from(code).map_err(|_| (position, c))
                } else {
                    Err((position, c))
                }
            })
            .collect()
    }

    /// Decoded text, or the position of the first byte the codec rejects.
    fn decode(self, bytes: &[u8]) -> Result<String, usize> {
        match self {
            Codec::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|err| err.utf8_error().valid_up_to()),
            Codec::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(position) => Err(position),
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            },
            Codec::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

/// Python `str.split()` without a separator: runs of whitespace, no empty
/// pieces.
fn split_whitespace(text: &str, maxsplit: Option<usize>) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if maxsplit.is_some_and(|max| parts.len() >= max) {
            parts.push(rest.to_owned());
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        parts.push(rest[..end].to_owned());
        rest = rest[end..].trim_start();
    }
    parts
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_cased = false;
    for c in text.chars() {
        if previous_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_cased = c.is_alphabetic();
    }
    out
}

/// Character index of the first `needle` in `haystack`, or -1.
fn char_find(haystack: &str, needle: &str) -> i64 {
    haystack
        .find(needle)
        .map_or(-1, |byte| i64::try_from(haystack[..byte].chars().count()).unwrap_or(-1))
}

impl Interpreter<'_> {
    /// Call native method `builtin` on `receiver`.
    pub(crate) fn call_native_method(
        &self,
        builtin: Builtin,
        receiver: &Value,
        args: CallArgs,
    ) -> EvalResult {
        match (builtin, receiver) {
            (Builtin::ObjectInit, _) => {
                if !args.args.is_empty() || !args.keywords.is_empty() {
                    return Err(self.type_error(
                        "object.__init__() takes exactly one argument (the instance to initialize)",
                    ));
                }
                Ok(Value::None)
            }
            (Builtin::ExceptionInit, Value::Instance(instance)) => {
                self.no_keywords(&instance.class.name, &args)?;
                instance.dict.set("args", Value::tuple(args.args));
                Ok(Value::None)
            }
            (_, Value::List(_)) => self.list_method(builtin, receiver, args),
            (Builtin::SeqIndex | Builtin::SeqCount, Value::Tuple(items)) => {
                self.sequence_search(builtin, "tuple", items, args)
            }
            (_, Value::Dict(_)) => self.dict_method(builtin, receiver, args),
            (Builtin::StrEncode, Value::Str(text)) => self.str_encode(text, args),
            (_, Value::Str(text)) => self.str_method(builtin, text, args),
            (Builtin::BytesDecode, Value::Bytes(bytes)) => self.bytes_decode(bytes, args),
            (Builtin::ComplexConjugate, Value::Complex(c)) => {
                self.no_keywords(builtin.name(), &args)?;
                self.arity(builtin.name(), &args.args, 0, 0)?;
                Ok(Value::Complex(Complex::new(c.re, -c.im)))
            }
            (_, Value::Set(_)) => self.set_method(builtin, receiver, args),
            (Builtin::PropertyGetter | Builtin::PropertySetter, Value::Property(property)) => {
                self.no_keywords(builtin.name(), &args)?;
                self.arity(builtin.name(), &args.args, 1, 1)?;
                let accessor = args.args.into_iter().next();
                Ok(Value::Property(Rc::new(if builtin == Builtin::PropertyGetter {
                    Property {
                        fget: accessor,
                        fset: property.fset.clone(),
                    }
                } else {
                    Property {
                        fget: property.fget.clone(),
                        fset: accessor,
                    }
                })))
            }
            (builtin, receiver) => Err(self.type_error(format!(
                "descriptor '{}' does not apply to a '{}' object",
                builtin.name(),
                receiver.type_name()
            ))),
        }
    }

    fn list_method(&self, builtin: Builtin, receiver: &Value, mut args: CallArgs) -> EvalResult {
        let Value::List(list) = receiver else {
            return Err(self.type_error("expected a list"));
        };
        let name = builtin.name();
        if builtin == Builtin::ListSort {
            let key = args.take_keyword("key").filter(|key| !key.is_none());
            let reverse = match args.take_keyword("reverse") {
                Some(flag) => self.truthy(&flag)?,
                None => false,
            };
            self.no_extra_keywords(name, &args)?;
            if !args.args.is_empty() {
                return Err(self.type_error("sort() takes no positional arguments"));
            }
            // Sort a copy so key functions observe a stable list.
            let mut items = list.borrow().clone();
            self.sort_values(&mut items, key.as_ref(), reverse)?;
            *list.borrow_mut() = items;
            return Ok(Value::None);
        }
        self.no_keywords(name, &args)?;
        match builtin {
            Builtin::ListAppend => {
                self.arity(name, &args.args, 1, 1)?;
                list.borrow_mut().extend(args.args);
                Ok(Value::None)
            }
            Builtin::ListExtend => {
                self.arity(name, &args.args, 1, 1)?;
                let items = self.iterate(&args.args[0])?;
                list.borrow_mut().extend(items);
                Ok(Value::None)
            }
            Builtin::ListInsert => {
                self.arity(name, &args.args, 2, 2)?;
                let index = self.index_int(&args.args[0])?;
                let mut items = list.borrow_mut();
                let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
                let index = if index < 0 { (index + len).max(0) } else { index.min(len) };
                let index = usize::try_from(index).unwrap_or(items.len());
                items.insert(index, args.args[1].clone());
                Ok(Value::None)
            }
            Builtin::ListPop => {
                self.arity(name, &args.args, 0, 1)?;
                let mut items = list.borrow_mut();
                if items.is_empty() {
                    return Err(self.index_error("pop from empty list"));
                }
                let index = match args.args.first() {
                    Some(index) => self.index_int(index)?,
                    None => -1,
                };
                let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
                let resolved = if index < 0 { index + len } else { index };
                match usize::try_from(resolved).ok().filter(|i| *i < items.len()) {
                    Some(i) => Ok(items.remove(i)),
                    None => Err(self.index_error("pop index out of range")),
                }
            }
            Builtin::ListCopy => {
                self.arity(name, &args.args, 0, 0)?;
                Ok(Value::list(list.borrow().clone()))
            }
            Builtin::ListReverse => {
                self.arity(name, &args.args, 0, 0)?;
                list.borrow_mut().reverse();
                Ok(Value::None)
            }
            Builtin::ListClear => {
                self.arity(name, &args.args, 0, 0)?;
                list.borrow_mut().clear();
                Ok(Value::None)
            }
            Builtin::ListRemove => {
                self.arity(name, &args.args, 1, 1)?;
                let items = list.borrow().clone();
                for (i, item) in items.iter().enumerate() {
                    if item.is(&args.args[0]) || self.values_equal(item, &args.args[0])? {
                        list.borrow_mut().remove(i);
                        return Ok(Value::None);
                    }
                }
                Err(self.value_error("list.remove(x): x not in list"))
            }
            Builtin::SeqIndex | Builtin::SeqCount => {
                let items = list.borrow().clone();
                self.sequence_search(builtin, "list", &items, args)
            }
            other => Err(self.missing_attribute(receiver, other.name())),
        }
    }

    /// `index` and `count` for lists and tuples.
    fn sequence_search(
        &self,
        builtin: Builtin,
        kind: &str,
        items: &[Value],
        args: CallArgs,
    ) -> EvalResult {
        let name = builtin.name();
        self.no_keywords(name, &args)?;
        if builtin == Builtin::SeqCount {
            self.arity(name, &args.args, 1, 1)?;
            let mut count = 0i64;
            for item in items {
                if item.is(&args.args[0]) || self.values_equal(item, &args.args[0])? {
                    count += 1;
                }
            }
            return Ok(Value::Int(count));
        }
        self.arity(name, &args.args, 1, 3)?;
        let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
        let bound = |value: Option<&Value>, default: i64| -> EvalResult<usize> {
            let raw = match value {
                Some(value) => self.index_int(value)?,
                None => default,
            };
            let resolved = if raw < 0 { (raw + len).max(0) } else { raw.min(len) };
            Ok(usize::try_from(resolved).unwrap_or_default())
        };
        let start = bound(args.args.get(1), 0)?;
        let stop = bound(args.args.get(2), len)?;
        for (i, item) in items.iter().enumerate().take(stop).skip(start) {
            if item.is(&args.args[0]) || self.values_equal(item, &args.args[0])? {
                return Ok(Value::Int(i64::try_from(i).map_err(|_| self.overflow())?));
            }
        }
        Err(self.value_error(format!("{kind}.index(x): x not in {kind}")))
    }

    fn dict_method(&self, builtin: Builtin, receiver: &Value, mut args: CallArgs) -> EvalResult {
        let Value::Dict(dict) = receiver else {
            return Err(self.type_error("expected a dict"));
        };
        let name = builtin.name();
        if builtin == Builtin::DictUpdate {
            self.arity(name, &args.args, 0, 1)?;
            let mut updated = dict.borrow().clone();
            if let Some(source) = args.args.first() {
                self.update_dict(&mut updated, source)?;
            }
            for (key, value) in std::mem::take(&mut args.keywords) {
                updated.insert(
                    crate::value::HashKey::Str(key.as_str().into()),
                    Value::from(key),
                    value,
                );
            }
            *dict.borrow_mut() = updated;
            return Ok(Value::None);
        }
        self.no_keywords(name, &args)?;
        match builtin {
            Builtin::DictGet => {
                self.arity(name, &args.args, 1, 2)?;
                let key = self.hash_key_of(&args.args[0])?;
                let found = dict.borrow().get(&key).cloned();
                Ok(found.unwrap_or_else(|| args.args.get(1).cloned().unwrap_or(Value::None)))
            }
            Builtin::DictKeys => {
                self.arity(name, &args.args, 0, 0)?;
                Ok(Value::list(dict.borrow().keys().cloned().collect()))
            }
            Builtin::DictValues => {
                self.arity(name, &args.args, 0, 0)?;
                Ok(Value::list(dict.borrow().values().cloned().collect()))
            }
            Builtin::DictItems => {
                self.arity(name, &args.args, 0, 0)?;
                let items = dict
                    .borrow()
                    .iter()
                    .map(|(k, v)| Value::tuple(vec![k.clone(), v.clone()]))
                    .collect();
                Ok(Value::list(items))
            }
            Builtin::DictPop => {
                self.arity(name, &args.args, 1, 2)?;
                let key = self.hash_key_of(&args.args[0])?;
                let removed = dict.borrow_mut().remove(&key);
                match (removed, args.args.get(1)) {
                    (Some((_, value)), _) => Ok(value),
                    (None, Some(default)) => Ok(default.clone()),
                    (None, None) => Err(self.key_error(args.args[0].clone())),
                }
            }
            Builtin::DictSetdefault => {
                self.arity(name, &args.args, 1, 2)?;
                let key = self.hash_key_of(&args.args[0])?;
                if let Some(existing) = dict.borrow().get(&key) {
                    return Ok(existing.clone());
                }
                let default = args.args.get(1).cloned().unwrap_or(Value::None);
                dict.borrow_mut().insert(key, args.args[0].clone(), default.clone());
                Ok(default)
            }
            Builtin::DictCopy => {
                self.arity(name, &args.args, 0, 0)?;
                Ok(Value::dict(dict.borrow().clone()))
            }
            Builtin::DictClear => {
                self.arity(name, &args.args, 0, 0)?;
                dict.borrow_mut().clear();
                Ok(Value::None)
            }
            other => Err(self.missing_attribute(receiver, other.name())),
        }
    }

    /// Encoding from the `encoding` argument; `errors` must be `strict`.
    fn codec(&self, name: &str, mut args: CallArgs) -> EvalResult<Codec> {
        let encoding = args.take_keyword("encoding");
        let errors = args.take_keyword("errors");
        self.no_extra_keywords(name, &args)?;
        self.arity(name, &args.args, 0, 2)?;
        let encoding = encoding.or_else(|| args.args.first().cloned());
        let errors = errors.or_else(|| args.args.get(1).cloned());
        if let Some(errors) = errors {
            if errors.as_str() != Some("strict") {
                return Err(self.value_error("only the 'strict' error handler is supported"));
            }
        }
        match encoding {
            None => Ok(Codec::Utf8),
            Some(Value::Str(encoding)) => Codec::named(&encoding).ok_or_else(|| {
                self.exception(
                    crate::exception::ExceptionKind::LookupError,
                    format!("unknown encoding: {encoding}"),
                )
            }),
            Some(other) => Err(self.type_error(format!(
                "{name}() argument 'encoding' must be str, not {}",
                other.type_name()
            ))),
        }
    }

    pub(crate) fn str_encode(&self, text: &str, args: CallArgs) -> EvalResult {
        let codec = self.codec("encode", args)?;
        codec.encode(text).map(Value::bytes).map_err(|(position, c)| {
            self.value_error(format!(
                "'{}' codec can't encode character {:?} in position {position}",
                codec.name(),
                c
            ))
        })
    }

    fn bytes_decode(&self, bytes: &[u8], args: CallArgs) -> EvalResult {
        let codec = self.codec("decode", args)?;
        codec.decode(bytes).map(Value::from).map_err(|position| {
            self.value_error(format!(
                "'{}' codec can't decode byte {:#04x} in position {position}",
                codec.name(),
                bytes.get(position).copied().unwrap_or_default()
            ))
        })
    }

    /// Members of every argument, as sets.
    fn set_arguments(&self, args: &[Value]) -> EvalResult<Vec<SetValue>> {
        args.iter().map(|iterable| self.collect_set(iterable)).collect()
    }

    /// Hash every item of `iterable` into a new set.
    pub(crate) fn collect_set(&self, iterable: &Value) -> EvalResult<SetValue> {
        if let Value::Set(set) = iterable {
            return Ok(set.borrow().clone());
        }
        let mut set = SetValue::new();
        for item in self.iterate(iterable)? {
            let hash = self.hash_key_of(&item)?;
            set.insert(hash, item);
        }
        Ok(set)
    }

    fn set_method(&self, builtin: Builtin, receiver: &Value, args: CallArgs) -> EvalResult {
        let Value::Set(set) = receiver else {
            return Err(self.type_error("expected a set"));
        };
        let name = builtin.name();
        self.no_keywords(name, &args)?;
        match builtin {
            Builtin::SetAdd | Builtin::SetDiscard | Builtin::SetRemove => {
                self.arity(name, &args.args, 1, 1)?;
                let item = &args.args[0];
                let hash = self.hash_key_of(item)?;
                if builtin == Builtin::SetAdd {
                    set.borrow_mut().insert(hash, item.clone());
                    return Ok(Value::None);
                }
                let removed = set.borrow_mut().remove(&hash);
                if removed.is_none() && builtin == Builtin::SetRemove {
                    return Err(self.key_error(item.clone()));
                }
                Ok(Value::None)
            }
            Builtin::SetPop => {
                self.arity(name, &args.args, 0, 0)?;
                let popped = set.borrow_mut().pop();
                popped.ok_or_else(|| {
                    self.exception(
                        crate::exception::ExceptionKind::KeyError,
                        "pop from an empty set",
                    )
                })
            }
            Builtin::SetClear => {
                self.arity(name, &args.args, 0, 0)?;
                set.borrow_mut().clear();
                Ok(Value::None)
            }
            Builtin::SetCopy => {
                self.arity(name, &args.args, 0, 0)?;
                Ok(Value::set(set.borrow().clone()))
            }
            Builtin::SetUpdate => {
                let others = self.set_arguments(&args.args)?;
                let mut set = set.borrow_mut();
                for other in &others {
                    set.extend(other);
                }
                Ok(Value::None)
            }
            Builtin::SetUnion | Builtin::SetIntersection | Builtin::SetDifference => {
                let others = self.set_arguments(&args.args)?;
                let mut result = set.borrow().clone();
                for other in &others {
                    result = match builtin {
                        Builtin::SetUnion => result.union(other),
                        Builtin::SetIntersection => result.intersection(other),
                        _ => result.difference(other),
                    };
                }
                Ok(Value::set(result))
            }
            Builtin::SetIssubset | Builtin::SetIssuperset => {
                self.arity(name, &args.args, 1, 1)?;
                let other = self.collect_set(&args.args[0])?;
                let set = set.borrow();
                Ok(Value::Bool(if builtin == Builtin::SetIssubset {
                    set.is_subset(&other)
                } else {
                    other.is_subset(&set)
                }))
            }
            other => Err(self.missing_attribute(receiver, other.name())),
        }
    }

    fn str_method(&self, builtin: Builtin, text: &Rc<str>, mut args: CallArgs) -> EvalResult {
        let name = builtin.name();
        match builtin {
            Builtin::StrFormat => return self.str_format(text, &args).map(Value::from),
            Builtin::StrSplit => {
                let sep = args.take_keyword("sep");
                let maxsplit = args.take_keyword("maxsplit");
                self.no_extra_keywords(name, &args)?;
                self.arity(name, &args.args, 0, 2)?;
                let sep = sep.or_else(|| args.args.first().cloned()).filter(|s| !s.is_none());
                let maxsplit = match maxsplit.or_else(|| args.args.get(1).cloned()) {
                    Some(n) => usize::try_from(self.index_int(&n)?).ok(),
                    None => None,
                };
                let parts = match sep {
                    None => split_whitespace(text, maxsplit),
                    Some(Value::Str(sep)) if sep.is_empty() => {
                        return Err(self.value_error("empty separator"));
                    }
                    Some(Value::Str(sep)) => match maxsplit {
                        Some(max) => text.splitn(max + 1, &*sep).map(str::to_owned).collect(),
                        None => text.split(&*sep).map(str::to_owned).collect(),
                    },
                    Some(other) => {
                        return Err(self.type_error(format!(
                            "must be str or None, not {}",
                            other.type_name()
                        )));
                    }
                };
                return Ok(Value::list(parts.into_iter().map(Value::from).collect()));
            }
            _ => self.no_keywords(name, &args)?,
        }
        match builtin {
            Builtin::StrJoin => {
                self.arity(name, &args.args, 1, 1)?;
                let mut pieces = Vec::new();
                for (i, item) in self.iterate(&args.args[0])?.into_iter().enumerate() {
                    match item {
                        Value::Str(s) => pieces.push(s),
                        other => {
                            return Err(self.type_error(format!(
                                "sequence item {i}: expected str instance, {} found",
                                other.type_name()
                            )))
                        }
                    }
                }
                let pieces: Vec<&str> = pieces.iter().map(AsRef::as_ref).collect();
                Ok(Value::from(pieces.join(&**text)))
            }
            Builtin::StrSplitlines => {
                self.arity(name, &args.args, 0, 0)?;
                Ok(Value::list(text.lines().map(Value::from).collect()))
            }
            Builtin::StrStrip | Builtin::StrLstrip | Builtin::StrRstrip => {
                self.arity(name, &args.args, 0, 1)?;
                let chars: Option<Vec<char>> = match args.args.first() {
                    None | Some(Value::None) => None,
                    Some(Value::Str(s)) => Some(s.chars().collect()),
                    Some(other) => {
                        return Err(self.type_error(format!(
                            "{name} arg must be None or str, not {}",
                            other.type_name()
                        )))
                    }
                };
                let matches = |c: char| chars.as_ref().map_or(
                    c.is_whitespace(),
                    |set| set.contains(&c),
                );
                let stripped = match builtin {
                    Builtin::StrLstrip => text.trim_start_matches(matches),
                    Builtin::StrRstrip => text.trim_end_matches(matches),
                    _ => text.trim_matches(matches),
                };
                Ok(Value::from(stripped))
            }
            Builtin::StrUpper => {
                self.arity(name, &args.args, 0, 0)?;
                Ok(Value::from(text.to_uppercase()))
            }
            Builtin::StrLower => {
                self.arity(name, &args.args, 0, 0)?;
                Ok(Value::from(text.to_lowercase()))
            }
            Builtin::StrTitle => {
                self.arity(name, &args.args, 0, 0)?;
                Ok(Value::from(title_case(text)))
            }
            Builtin::StrStartswith | Builtin::StrEndswith => {
                self.arity(name, &args.args, 1, 1)?;
                let candidates: Vec<Value> = match &args.args[0] {
                    Value::Tuple(items) => items.to_vec(),
                    other => vec![other.clone()],
                };
                for candidate in candidates {
                    let Value::Str(affix) = &candidate else {
                        return Err(self.type_error(format!(
                            "{name} first arg must be str or a tuple of str, not {}",
                            candidate.type_name()
                        )));
                    };
                    let hit = if builtin == Builtin::StrStartswith {
                        text.starts_with(&**affix)
                    } else {
                        text.ends_with(&**affix)
                    };
                    if hit {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Builtin::StrReplace => {
                self.arity(name, &args.args, 2, 3)?;
                let (Value::Str(old), Value::Str(new)) = (&args.args[0], &args.args[1]) else {
                    return Err(self.type_error("replace() arguments must be str"));
                };
                let count = match args.args.get(2) {
                    Some(count) => self.index_int(count)?,
                    None => -1,
                };
                Ok(Value::from(match usize::try_from(count) {
                    Ok(count) => text.replacen(&**old, new, count),
                    Err(_) => text.replace(&**old, new),
                }))
            }
            Builtin::StrFind | Builtin::StrCount => {
                self.arity(name, &args.args, 1, 1)?;
                let Value::Str(needle) = &args.args[0] else {
                    return Err(self.type_error(format!(
                        "must be str, not {}",
                        args.args[0].type_name()
                    )));
                };
                if builtin == Builtin::StrFind {
                    return Ok(Value::Int(char_find(text, needle)));
                }
                let count = if needle.is_empty() {
                    text.chars().count() + 1
                } else {
                    text.matches(&**needle).count()
                };
                Ok(Value::Int(i64::try_from(count).map_err(|_| self.overflow())?))
            }
            Builtin::StrIsdigit => {
                self.arity(name, &args.args, 0, 0)?;
                Ok(Value::Bool(!text.is_empty() && text.chars().all(|c| c.is_ascii_digit())))
            }
            other => Err(self.missing_attribute(&Value::Str(Rc::clone(text)), other.name())),
        }
    }
}
