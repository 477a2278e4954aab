//! Natively implemented functions and methods.

use super::TypeTag;

/// A function implemented by the runtime.
///
/// Methods of builtin types are builtins too; attribute lookup binds them to
/// their receiver as a [`super::BoundMethod`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    // Global functions
    Print,
    Len,
    Repr,
    IsInstance,
    IsSubclass,
    HasAttr,
    GetAttr,
    SetAttr,
    Abs,
    Min,
    Max,
    Sum,
    Sorted,
    Reversed,
    Enumerate,
    Zip,
    Map,
    Filter,
    Any,
    All,
    Round,
    Id,
    Callable,
    Chr,
    Ord,
    Super,
    StaticMethod,
    ClassMethod,
    Property,
    Next,
    GetIpython,

    // object / BaseException
    ObjectInit,
    ExceptionInit,

    // list and tuple
    ListAppend,
    ListExtend,
    ListInsert,
    ListPop,
    ListCopy,
    ListReverse,
    ListClear,
    ListSort,
    ListRemove,
    SeqIndex,
    SeqCount,

    // dict
    DictGet,
    DictKeys,
    DictValues,
    DictItems,
    DictUpdate,
    DictPop,
    DictSetdefault,
    DictCopy,
    DictClear,

    // str
    StrJoin,
    StrSplit,
    StrSplitlines,
    StrStrip,
    StrLstrip,
    StrRstrip,
    StrUpper,
    StrLower,
    StrTitle,
    StrStartswith,
    StrEndswith,
    StrReplace,
    StrFormat,
    StrFind,
    StrCount,
    StrIsdigit,
    StrEncode,

    // bytes and complex
    BytesDecode,
    ComplexConjugate,

    // set
    SetAdd,
    SetDiscard,
    SetRemove,
    SetPop,
    SetClear,
    SetCopy,
    SetUpdate,
    SetUnion,
    SetIntersection,
    SetDifference,
    SetIssubset,
    SetIssuperset,

    // property
    PropertyGetter,
    PropertySetter,
}

/// Names bound in the builtins namespace.
pub(crate) const GLOBALS: &[(&str, Builtin)] = &[
    ("print", Builtin::Print),
    ("len", Builtin::Len),
    ("repr", Builtin::Repr),
    ("isinstance", Builtin::IsInstance),
    ("issubclass", Builtin::IsSubclass),
    ("hasattr", Builtin::HasAttr),
    ("getattr", Builtin::GetAttr),
    ("setattr", Builtin::SetAttr),
    ("abs", Builtin::Abs),
    ("min", Builtin::Min),
    ("max", Builtin::Max),
    ("sum", Builtin::Sum),
    ("sorted", Builtin::Sorted),
    ("reversed", Builtin::Reversed),
    ("enumerate", Builtin::Enumerate),
    ("zip", Builtin::Zip),
    ("map", Builtin::Map),
    ("filter", Builtin::Filter),
    ("any", Builtin::Any),
    ("all", Builtin::All),
    ("round", Builtin::Round),
    ("id", Builtin::Id),
    ("callable", Builtin::Callable),
    ("chr", Builtin::Chr),
    ("ord", Builtin::Ord),
    ("super", Builtin::Super),
    ("staticmethod", Builtin::StaticMethod),
    ("classmethod", Builtin::ClassMethod),
    ("property", Builtin::Property),
    ("next", Builtin::Next),
];

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Len => "len",
            Builtin::Repr => "repr",
            Builtin::IsInstance => "isinstance",
            Builtin::IsSubclass => "issubclass",
            Builtin::HasAttr => "hasattr",
            Builtin::GetAttr => "getattr",
            Builtin::SetAttr => "setattr",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Sum => "sum",
            Builtin::Sorted => "sorted",
            Builtin::Reversed => "reversed",
            Builtin::Enumerate => "enumerate",
            Builtin::Zip => "zip",
            Builtin::Map => "map",
            Builtin::Filter => "filter",
            Builtin::Any => "any",
            Builtin::All => "all",
            Builtin::Round => "round",
            Builtin::Id => "id",
            Builtin::Callable => "callable",
            Builtin::Chr => "chr",
            Builtin::Ord => "ord",
            Builtin::Super => "super",
            Builtin::StaticMethod => "staticmethod",
            Builtin::ClassMethod => "classmethod",
            Builtin::Property => "property",
            Builtin::Next => "next",
            Builtin::GetIpython => "get_ipython",
            Builtin::ObjectInit | Builtin::ExceptionInit => "__init__",
            Builtin::ListAppend => "append",
            Builtin::ListExtend => "extend",
            Builtin::ListInsert => "insert",
            Builtin::ListPop | Builtin::DictPop | Builtin::SetPop => "pop",
            Builtin::ListCopy | Builtin::DictCopy | Builtin::SetCopy => "copy",
            Builtin::ListReverse => "reverse",
            Builtin::ListClear | Builtin::DictClear | Builtin::SetClear => "clear",
            Builtin::ListSort => "sort",
            Builtin::ListRemove | Builtin::SetRemove => "remove",
            Builtin::SeqIndex => "index",
            Builtin::SeqCount | Builtin::StrCount => "count",
            Builtin::DictGet => "get",
            Builtin::DictKeys => "keys",
            Builtin::DictValues => "values",
            Builtin::DictItems => "items",
            Builtin::DictUpdate | Builtin::SetUpdate => "update",
            Builtin::DictSetdefault => "setdefault",
            Builtin::StrJoin => "join",
            Builtin::StrSplit => "split",
            Builtin::StrSplitlines => "splitlines",
            Builtin::StrStrip => "strip",
            Builtin::StrLstrip => "lstrip",
            Builtin::StrRstrip => "rstrip",
            Builtin::StrUpper => "upper",
            Builtin::StrLower => "lower",
            Builtin::StrTitle => "title",
            Builtin::StrStartswith => "startswith",
            Builtin::StrEndswith => "endswith",
            Builtin::StrReplace => "replace",
            Builtin::StrFormat => "format",
            Builtin::StrFind => "find",
            Builtin::StrIsdigit => "isdigit",
            Builtin::StrEncode => "encode",
            Builtin::BytesDecode => "decode",
            Builtin::ComplexConjugate => "conjugate",
            Builtin::SetAdd => "add",
            Builtin::SetDiscard => "discard",
            Builtin::SetUnion => "union",
            Builtin::SetIntersection => "intersection",
            Builtin::SetDifference => "difference",
            Builtin::SetIssubset => "issubset",
            Builtin::SetIssuperset => "issuperset",
            Builtin::PropertyGetter => "getter",
            Builtin::PropertySetter => "setter",
        }
    }

    /// Whether this builtin is bound in the builtins namespace rather than
    /// being a method of a builtin type.
    pub fn is_global(self) -> bool {
        self == Builtin::GetIpython || GLOBALS.iter().any(|(_, builtin)| *builtin == self)
    }

    /// Method `name` of builtin type `tag`, if it has one.
    pub fn method(tag: TypeTag, name: &str) -> Option<Builtin> {
        Some(match (tag, name) {
            (TypeTag::List, "append") => Builtin::ListAppend,
            (TypeTag::List, "extend") => Builtin::ListExtend,
            (TypeTag::List, "insert") => Builtin::ListInsert,
            (TypeTag::List, "pop") => Builtin::ListPop,
            (TypeTag::List, "copy") => Builtin::ListCopy,
            (TypeTag::List, "reverse") => Builtin::ListReverse,
            (TypeTag::List, "clear") => Builtin::ListClear,
            (TypeTag::List, "sort") => Builtin::ListSort,
            (TypeTag::List, "remove") => Builtin::ListRemove,
            (TypeTag::List | TypeTag::Tuple, "index") => Builtin::SeqIndex,
            (TypeTag::List | TypeTag::Tuple, "count") => Builtin::SeqCount,
            (TypeTag::Dict, "get") => Builtin::DictGet,
            (TypeTag::Dict, "keys") => Builtin::DictKeys,
            (TypeTag::Dict, "values") => Builtin::DictValues,
            (TypeTag::Dict, "items") => Builtin::DictItems,
            (TypeTag::Dict, "update") => Builtin::DictUpdate,
            (TypeTag::Dict, "pop") => Builtin::DictPop,
            (TypeTag::Dict, "setdefault") => Builtin::DictSetdefault,
            (TypeTag::Dict, "copy") => Builtin::DictCopy,
            (TypeTag::Dict, "clear") => Builtin::DictClear,
            (TypeTag::Str, "join") => Builtin::StrJoin,
            (TypeTag::Str, "split") => Builtin::StrSplit,
            (TypeTag::Str, "splitlines") => Builtin::StrSplitlines,
            (TypeTag::Str, "strip") => Builtin::StrStrip,
            (TypeTag::Str, "lstrip") => Builtin::StrLstrip,
            (TypeTag::Str, "rstrip") => Builtin::StrRstrip,
            (TypeTag::Str, "upper") => Builtin::StrUpper,
            (TypeTag::Str, "lower") => Builtin::StrLower,
            (TypeTag::Str, "title") => Builtin::StrTitle,
            (TypeTag::Str, "startswith") => Builtin::StrStartswith,
            (TypeTag::Str, "endswith") => Builtin::StrEndswith,
            (TypeTag::Str, "replace") => Builtin::StrReplace,
            (TypeTag::Str, "format") => Builtin::StrFormat,
            (TypeTag::Str, "find") => Builtin::StrFind,
            (TypeTag::Str, "count") => Builtin::StrCount,
            (TypeTag::Str, "isdigit") => Builtin::StrIsdigit,
            (TypeTag::Str, "encode") => Builtin::StrEncode,
            (TypeTag::Bytes, "decode") => Builtin::BytesDecode,
            (TypeTag::Complex, "conjugate") => Builtin::ComplexConjugate,
            (TypeTag::Set, "add") => Builtin::SetAdd,
            (TypeTag::Set, "discard") => Builtin::SetDiscard,
            (TypeTag::Set, "remove") => Builtin::SetRemove,
            (TypeTag::Set, "pop") => Builtin::SetPop,
            (TypeTag::Set, "clear") => Builtin::SetClear,
            (TypeTag::Set, "copy") => Builtin::SetCopy,
            (TypeTag::Set, "update") => Builtin::SetUpdate,
            (TypeTag::Set, "union") => Builtin::SetUnion,
            (TypeTag::Set, "intersection") => Builtin::SetIntersection,
            (TypeTag::Set, "difference") => Builtin::SetDifference,
            (TypeTag::Set, "issubset") => Builtin::SetIssubset,
            (TypeTag::Set, "issuperset") => Builtin::SetIssuperset,
            (TypeTag::Property, "getter") => Builtin::PropertyGetter,
            (TypeTag::Property, "setter") => Builtin::PropertySetter,
            _ => return None,
        })
    }
}
