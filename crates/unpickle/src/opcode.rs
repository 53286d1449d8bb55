//! The pickle opcode table
//!
//! Byte values match protocols 0 through 5 exactly; this table is the wire
//! contract.

use std::fmt;

/// Highest protocol version this decoder understands
pub const HIGHEST_PROTOCOL: u8 = 5;

/// A pickle instruction tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // ═══════════════════════════════════════════════════════════════════
    // Protocol 0 and 1
    // ═══════════════════════════════════════════════════════════════════
    /// Push the stack onto the mark stack and start a fresh one
    Mark = b'(',
    /// Pop the root and finish
    Stop = b'.',
    /// Discard the top item
    Pop = b'0',
    /// Discard everything back to the last mark
    PopMark = b'1',
    /// Duplicate the top item
    Dup = b'2',
    /// Float from a decimal text line
    Float = b'F',
    /// Integer (or bool) from a decimal text line
    Int = b'I',
    /// 4-byte signed little-endian integer
    BinInt = b'J',
    /// 1-byte unsigned integer
    BinInt1 = b'K',
    /// Arbitrary-precision integer from a decimal text line
    Long = b'L',
    /// 2-byte unsigned little-endian integer
    BinInt2 = b'M',
    /// Push None
    None = b'N',
    /// Persistent id from a text line
    PersId = b'P',
    /// Persistent id popped from the stack
    BinPersId = b'Q',
    /// Call a callable with an argument tuple
    Reduce = b'R',
    /// Quoted string line
    String = b'S',
    /// Counted string, 4-byte signed length
    BinString = b'T',
    /// Counted string, 1-byte length
    ShortBinString = b'U',
    /// Raw-unicode-escape text line
    Unicode = b'V',
    /// UTF-8 text, 4-byte length
    BinUnicode = b'X',
    /// Append one item to the list below
    Append = b'a',
    /// Apply state to the object below
    Build = b'b',
    /// Resolve a class from two text lines
    Global = b'c',
    /// Dict from marked key/value items
    Dict = b'd',
    /// Push an empty dict
    EmptyDict = b'}',
    /// Extend the list below with marked items
    Appends = b'e',
    /// Memo get, decimal text index
    Get = b'g',
    /// Memo get, 1-byte index
    BinGet = b'h',
    /// Resolve a class from two lines and instantiate with marked args
    Inst = b'i',
    /// Memo get, 4-byte index
    LongBinGet = b'j',
    /// List from marked items
    List = b'l',
    /// Push an empty list
    EmptyList = b']',
    /// Instantiate the first marked item with the rest as args
    Obj = b'o',
    /// Memo put, decimal text index
    Put = b'p',
    /// Memo put, 1-byte index
    BinPut = b'q',
    /// Memo put, 4-byte index
    LongBinPut = b'r',
    /// Set one key/value pair on the dict below
    SetItem = b's',
    /// Tuple from marked items
    Tuple = b't',
    /// Push an empty tuple
    EmptyTuple = b')',
    /// Set marked key/value pairs on the dict below
    SetItems = b'u',
    /// 8-byte big-endian double
    BinFloat = b'G',

    // ═══════════════════════════════════════════════════════════════════
    // Protocol 2
    // ═══════════════════════════════════════════════════════════════════
    /// Protocol version marker
    Proto = 0x80,
    /// `cls.__new__(cls, *args)`
    NewObj = 0x81,
    /// Extension code, 1 byte
    Ext1 = 0x82,
    /// Extension code, 2 bytes
    Ext2 = 0x83,
    /// Extension code, 4 bytes
    Ext4 = 0x84,
    /// 1-tuple from the top item
    Tuple1 = 0x85,
    /// 2-tuple from the top two items
    Tuple2 = 0x86,
    /// 3-tuple from the top three items
    Tuple3 = 0x87,
    /// Push True
    NewTrue = 0x88,
    /// Push False
    NewFalse = 0x89,
    /// Two's-complement long, 1-byte length
    Long1 = 0x8a,
    /// Two's-complement long, 4-byte length
    Long4 = 0x8b,

    // ═══════════════════════════════════════════════════════════════════
    // Protocol 3
    // ═══════════════════════════════════════════════════════════════════
    /// Bytes, 4-byte length
    BinBytes = b'B',
    /// Bytes, 1-byte length
    ShortBinBytes = b'C',

    // ═══════════════════════════════════════════════════════════════════
    // Protocol 4
    // ═══════════════════════════════════════════════════════════════════
    /// UTF-8 text, 1-byte length
    ShortBinUnicode = 0x8c,
    /// UTF-8 text, 8-byte length
    BinUnicode8 = 0x8d,
    /// Bytes, 8-byte length
    BinBytes8 = 0x8e,
    /// Push an empty set
    EmptySet = 0x8f,
    /// Add marked items to the set below
    AddItems = 0x90,
    /// Frozen set from marked items
    FrozenSet = 0x91,
    /// `cls.__new__(cls, *args, **kwargs)`
    NewObjEx = 0x92,
    /// Resolve a class from two stack items
    StackGlobal = 0x93,
    /// Memo put at the next free index
    Memoize = 0x94,
    /// Begin a frame
    Frame = 0x95,

    // ═══════════════════════════════════════════════════════════════════
    // Protocol 5
    // ═══════════════════════════════════════════════════════════════════
    /// Byte array, 8-byte length
    ByteArray8 = 0x96,
    /// Out-of-band buffer
    NextBuffer = 0x97,
    /// Make the top buffer read-only
    ReadOnlyBuffer = 0x98,
}

impl Opcode {
    /// Every opcode, in table order
    pub const ALL: [Opcode; 68] = [
        Opcode::Mark,
        Opcode::Stop,
        Opcode::Pop,
        Opcode::PopMark,
        Opcode::Dup,
        Opcode::Float,
        Opcode::Int,
        Opcode::BinInt,
        Opcode::BinInt1,
        Opcode::Long,
        Opcode::BinInt2,
        Opcode::None,
        Opcode::PersId,
        Opcode::BinPersId,
        Opcode::Reduce,
        Opcode::String,
        Opcode::BinString,
        Opcode::ShortBinString,
        Opcode::Unicode,
        Opcode::BinUnicode,
        Opcode::Append,
        Opcode::Build,
        Opcode::Global,
        Opcode::Dict,
        Opcode::EmptyDict,
        Opcode::Appends,
        Opcode::Get,
        Opcode::BinGet,
        Opcode::Inst,
        Opcode::LongBinGet,
        Opcode::List,
        Opcode::EmptyList,
        Opcode::Obj,
        Opcode::Put,
        Opcode::BinPut,
        Opcode::LongBinPut,
        Opcode::SetItem,
        Opcode::Tuple,
        Opcode::EmptyTuple,
        Opcode::SetItems,
        Opcode::BinFloat,
        Opcode::Proto,
        Opcode::NewObj,
        Opcode::Ext1,
        Opcode::Ext2,
        Opcode::Ext4,
        Opcode::Tuple1,
        Opcode::Tuple2,
        Opcode::Tuple3,
        Opcode::NewTrue,
        Opcode::NewFalse,
        Opcode::Long1,
        Opcode::Long4,
        Opcode::BinBytes,
        Opcode::ShortBinBytes,
        Opcode::ShortBinUnicode,
        Opcode::BinUnicode8,
        Opcode::BinBytes8,
        Opcode::EmptySet,
        Opcode::AddItems,
        Opcode::FrozenSet,
        Opcode::NewObjEx,
        Opcode::StackGlobal,
        Opcode::Memoize,
        Opcode::Frame,
        Opcode::ByteArray8,
        Opcode::NextBuffer,
        Opcode::ReadOnlyBuffer,
    ];

    /// Look up the opcode for a byte
    pub const fn from_byte(byte: u8) -> Option<Opcode> {
        let mut i = 0;
        while i < Self::ALL.len() {
            if Self::ALL[i] as u8 == byte {
                return Some(Self::ALL[i]);
            }
            i += 1;
        }
        None
    }

    /// The byte value on the wire
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// The conventional upper-case opcode name
    pub const fn name(self) -> &'static str {
        match self {
            Opcode::Mark => "MARK",
            Opcode::Stop => "STOP",
            Opcode::Pop => "POP",
            Opcode::PopMark => "POP_MARK",
            Opcode::Dup => "DUP",
            Opcode::Float => "FLOAT",
            Opcode::Int => "INT",
            Opcode::BinInt => "BININT",
            Opcode::BinInt1 => "BININT1",
            Opcode::Long => "LONG",
            Opcode::BinInt2 => "BININT2",
            Opcode::None => "NONE",
            Opcode::PersId => "PERSID",
            Opcode::BinPersId => "BINPERSID",
            Opcode::Reduce => "REDUCE",
            Opcode::String => "STRING",
            Opcode::BinString => "BINSTRING",
            Opcode::ShortBinString => "SHORT_BINSTRING",
            Opcode::Unicode => "UNICODE",
            Opcode::BinUnicode => "BINUNICODE",
            Opcode::Append => "APPEND",
            Opcode::Build => "BUILD",
            Opcode::Global => "GLOBAL",
            Opcode::Dict => "DICT",
            Opcode::EmptyDict => "EMPTY_DICT",
            Opcode::Appends => "APPENDS",
            Opcode::Get => "GET",
            Opcode::BinGet => "BINGET",
            Opcode::Inst => "INST",
            Opcode::LongBinGet => "LONG_BINGET",
            Opcode::List => "LIST",
            Opcode::EmptyList => "EMPTY_LIST",
            Opcode::Obj => "OBJ",
            Opcode::Put => "PUT",
            Opcode::BinPut => "BINPUT",
            Opcode::LongBinPut => "LONG_BINPUT",
            Opcode::SetItem => "SETITEM",
            Opcode::Tuple => "TUPLE",
            Opcode::EmptyTuple => "EMPTY_TUPLE",
            Opcode::SetItems => "SETITEMS",
            Opcode::BinFloat => "BINFLOAT",
            Opcode::Proto => "PROTO",
            Opcode::NewObj => "NEWOBJ",
            Opcode::Ext1 => "EXT1",
            Opcode::Ext2 => "EXT2",
            Opcode::Ext4 => "EXT4",
            Opcode::Tuple1 => "TUPLE1",
            Opcode::Tuple2 => "TUPLE2",
            Opcode::Tuple3 => "TUPLE3",
            Opcode::NewTrue => "NEWTRUE",
            Opcode::NewFalse => "NEWFALSE",
            Opcode::Long1 => "LONG1",
            Opcode::Long4 => "LONG4",
            Opcode::BinBytes => "BINBYTES",
            Opcode::ShortBinBytes => "SHORT_BINBYTES",
            Opcode::ShortBinUnicode => "SHORT_BINUNICODE",
            Opcode::BinUnicode8 => "BINUNICODE8",
            Opcode::BinBytes8 => "BINBYTES8",
            Opcode::EmptySet => "EMPTY_SET",
            Opcode::AddItems => "ADDITEMS",
            Opcode::FrozenSet => "FROZENSET",
            Opcode::NewObjEx => "NEWOBJ_EX",
            Opcode::StackGlobal => "STACK_GLOBAL",
            Opcode::Memoize => "MEMOIZE",
            Opcode::Frame => "FRAME",
            Opcode::ByteArray8 => "BYTEARRAY8",
            Opcode::NextBuffer => "NEXT_BUFFER",
            Opcode::ReadOnlyBuffer => "READONLY_BUFFER",
        }
    }

    /// The protocol version that introduced this opcode
    pub const fn protocol(self) -> u8 {
        match self as u8 {
            b'B' | b'C' => 3,
            0x80..=0x8b => 2,
            0x8c..=0x95 => 4,
            0x96..=0x98 => 5,
            _ => 0,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
