pub mod db;
pub mod hasher;
pub mod jwt;
