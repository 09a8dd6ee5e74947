use std::os::raw::{c_char, c_float, c_int, c_long, c_short, c_uchar, c_uint, c_ushort, c_void};

pub(crate) type MecabHandle = *mut c_void;
pub(crate) type CabochaHandle = *mut c_void;
pub(crate) type CabochaTreeHandle = *const c_void;

/// Layout of `mecab_node_t` from `mecab.h`.
#[repr(C)]
#[allow(dead_code)]
pub(crate) struct MecabNodeRaw {
    pub(crate) prev: *mut MecabNodeRaw,
    pub(crate) next: *mut MecabNodeRaw,
    pub(crate) enext: *mut MecabNodeRaw,
    pub(crate) bnext: *mut MecabNodeRaw,
    pub(crate) rpath: *mut c_void,
    pub(crate) lpath: *mut c_void,
    pub(crate) surface: *const c_char,
    pub(crate) feature: *const c_char,
    pub(crate) id: c_uint,
    pub(crate) length: c_ushort,
    pub(crate) rlength: c_ushort,
    pub(crate) rc_attr: c_ushort,
    pub(crate) lc_attr: c_ushort,
    pub(crate) posid: c_ushort,
    pub(crate) char_type: c_uchar,
    pub(crate) stat: c_uchar,
    pub(crate) isbest: c_uchar,
    pub(crate) alpha: c_float,
    pub(crate) beta: c_float,
    pub(crate) prob: c_float,
    pub(crate) wcost: c_short,
    pub(crate) cost: c_long,
}

/// Layout of `cabocha_chunk_t` from `cabocha.h`.
#[repr(C)]
#[allow(dead_code)]
pub(crate) struct CabochaChunkRaw {
    pub(crate) link: c_int,
    pub(crate) head_pos: usize,
    pub(crate) func_pos: usize,
    pub(crate) token_size: usize,
    pub(crate) token_pos: usize,
    pub(crate) score: c_float,
    pub(crate) feature_list: *const *const c_char,
    pub(crate) additional_info: *const c_char,
    pub(crate) feature_list_size: c_ushort,
}

/// Layout of `cabocha_token_t` from `cabocha.h`.
#[repr(C)]
#[allow(dead_code)]
pub(crate) struct CabochaTokenRaw {
    pub(crate) surface: *const c_char,
    pub(crate) normalized_surface: *const c_char,
    pub(crate) feature: *const c_char,
    pub(crate) feature_list: *const *const c_char,
    pub(crate) feature_list_size: c_ushort,
    pub(crate) ne: *const c_char,
    pub(crate) additional_info: *const c_char,
    pub(crate) chunk: *mut CabochaChunkRaw,
}
