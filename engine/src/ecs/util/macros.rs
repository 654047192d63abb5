/// Invoke a macro once per suffix of a list of type idents, longest first.
#[macro_export]
#[doc(hidden)]
macro_rules! for_each_tuple {
    ($m:ident !! $head:ident) => {
        $m!($head);
    };
    ($m:ident !! $head:ident, $($tail:ident),*) => (
        $m!($head, $( $tail ),*);
        $crate::for_each_tuple!($m !! $( $tail ),*);
    );
}

/// Apply a macro to tuples of one up to sixteen type parameters.
///
/// Filters name at most this many component types; wider conjunctions can be built with
/// [`Filter::from_mask`](crate::ecs::Filter::from_mask).
#[macro_export]
#[doc(hidden)]
macro_rules! tuples_up_to_16 {
    ($m:ident) => {
        $crate::for_each_tuple!($m !! A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P);
    };
}
